//! akamai_appsec_siem_settings
//!
//! SIEM integration of one security configuration. The API has no delete;
//! removal switches SIEM off for the configuration.

use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::id;
use edgeform_core::provider::{ProviderResult, Resource};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use edgeform_core::version::ConfigVersionResolver;

use super::client::{
    Appsec, GetSiemSettingsRequest, RemoveSiemSettingsRequest, SiemSettings,
    UpdateSiemSettingsRequest,
};
use crate::{output, upstream};

pub(crate) const RESOURCE_TYPE: &str = "akamai_appsec_siem_settings";
const VERSION_TAG: &str = "siemSetting";

pub(crate) struct SiemSettingsResource {
    pub(crate) client: ClientAccessor<dyn Appsec>,
    pub(crate) versions: Arc<dyn ConfigVersionResolver>,
}

fn config_id_from(d: &ResourceData) -> ProviderResult<i64> {
    let id = d.require_id()?;
    let parts = id::decompose(id, 1, "configID")?;
    id::parse_numeric(&parts[0], id, "configID")
}

fn render(settings: &SiemSettings) -> String {
    output::table(
        "SIEM settings",
        &[
            "ENABLE SIEM",
            "ENABLE FOR ALL POLICIES",
            "ENABLE BOTMAN SIEM",
            "SIEM DEFINITION ID",
            "FIREWALL POLICY IDS",
        ],
        &[vec![
            settings.enable_siem.to_string(),
            settings.enable_for_all_policies.to_string(),
            settings.enabled_botman_siem_events.to_string(),
            settings.siem_definition_id.to_string(),
            settings.firewall_policy_ids.join(","),
        ]],
    )
}

impl SiemSettingsResource {
    async fn write(
        &self,
        meta: &OperationMeta,
        config_id: i64,
        d: &ResourceData,
    ) -> ProviderResult<()> {
        let client = self.client.client(meta)?;
        let version = self
            .versions
            .modifiable_version(meta, config_id, VERSION_TAG)
            .await?;

        let request = UpdateSiemSettingsRequest {
            config_id,
            version,
            enable_for_all_policies: d.get_bool("enable_for_all_policies")?,
            enable_siem: d.get_bool("enable_siem")?,
            enabled_botman_siem_events: d.get_bool("enable_botman_siem")?,
            siem_definition_id: d.get_int("siem_id")?,
            firewall_policy_ids: d.get_string_list("security_policy_ids")?,
        };
        client
            .update_siem_settings(request)
            .await
            .map_err(upstream("UpdateSiemSettings"))?;
        Ok(())
    }
}

#[async_trait]
impl Resource for SiemSettingsResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("SIEM settings of a security configuration")
            .attribute(AttributeSchema::new("config_id", AttributeType::Int).required())
            .attribute(
                AttributeSchema::new("enable_siem", AttributeType::Bool)
                    .required()
                    .with_description("Whether to enable SIEM"),
            )
            .attribute(
                AttributeSchema::new("enable_for_all_policies", AttributeType::Bool)
                    .required()
                    .with_description("Whether to enable SIEM on all security policies"),
            )
            .attribute(
                AttributeSchema::new("enable_botman_siem", AttributeType::Bool)
                    .optional()
                    .with_default(Value::Bool(false))
                    .with_description("Whether bot management events are included"),
            )
            .attribute(
                AttributeSchema::new("siem_id", AttributeType::Int)
                    .required()
                    .with_description("SIEM definition ID"),
            )
            .attribute(
                AttributeSchema::new("security_policy_ids", types::string_set())
                    .optional()
                    .with_description("Security policies to enable SIEM on"),
            )
            .attribute(AttributeSchema::new("output_text", AttributeType::String).computed())
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", RESOURCE_TYPE);
        let config_id = d.get_int("config_id")?;
        self.write(meta, config_id, d).await?;
        d.set_id(config_id.to_string());
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let config_id = config_id_from(d)?;
        let version = self.versions.latest_version(meta, config_id).await?;

        let settings = client
            .get_siem_settings(GetSiemSettingsRequest { config_id, version })
            .await
            .map_err(upstream("GetSiemSettings"))?;

        d.set_attrs([
            ("config_id", Value::Int(config_id)),
            ("enable_siem", Value::Bool(settings.enable_siem)),
            (
                "enable_for_all_policies",
                Value::Bool(settings.enable_for_all_policies),
            ),
            (
                "enable_botman_siem",
                Value::Bool(settings.enabled_botman_siem_events),
            ),
            ("siem_id", Value::Int(settings.siem_definition_id)),
            (
                "security_policy_ids",
                Value::from(settings.firewall_policy_ids.clone()),
            ),
            ("output_text", Value::from(render(&settings))),
        ])
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", RESOURCE_TYPE);
        let config_id = config_id_from(d)?;
        self.write(meta, config_id, d).await?;
        self.read(meta, d).await
    }

    async fn delete(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let config_id = config_id_from(d)?;
        let version = self
            .versions
            .modifiable_version(meta, config_id, VERSION_TAG)
            .await?;

        client
            .remove_siem_settings(RemoveSiemSettingsRequest {
                config_id,
                version,
                enable_for_all_policies: false,
                enable_siem: false,
                enabled_botman_siem_events: false,
                siem_definition_id: None,
                firewall_policy_ids: None,
            })
            .await
            .map_err(upstream("RemoveSiemSettings"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::AppsecProvider;
    use super::super::mock::{Call, MockAppsec};
    use super::*;
    use edgeform_core::ProviderRegistry;
    use edgeform_core::client::ApiError;

    fn registry(mock: Arc<MockAppsec>) -> ProviderRegistry {
        ProviderRegistry::builder()
            .subprovider(Arc::new(AppsecProvider::with_client(mock)))
            .build()
            .unwrap()
    }

    fn planned(registry: &ProviderRegistry) -> ResourceData {
        registry
            .new_resource_data(RESOURCE_TYPE)
            .unwrap()
            .with_attribute("config_id", Value::Int(43253))
            .with_attribute("enable_siem", true)
            .with_attribute("enable_for_all_policies", false)
            .with_attribute("enable_botman_siem", true)
            .with_attribute("siem_id", Value::Int(1))
            .with_attribute("security_policy_ids", vec!["12345".to_string()])
    }

    #[tokio::test]
    async fn create_then_delete() {
        let mock = Arc::new(MockAppsec::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();

        let mut d = planned(&registry);
        let diags = registry.create(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(d.id(), Some("43253"));
        assert!(mock.calls().contains(&Call::UpdateSiemSettings(
            UpdateSiemSettingsRequest {
                config_id: 43253,
                version: 7,
                enable_for_all_policies: false,
                enable_siem: true,
                enabled_botman_siem_events: true,
                siem_definition_id: 1,
                firewall_policy_ids: vec!["12345".to_string()],
            }
        )));
        assert!(
            mock.calls()
                .contains(&Call::GetSiemSettings(GetSiemSettingsRequest {
                    config_id: 43253,
                    version: 7,
                }))
        );
        assert!(d.get_string("output_text").unwrap().contains("SIEM settings"));

        let diags = registry.delete(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(d.id(), None);
        assert_eq!(
            mock.calls().last(),
            Some(&Call::RemoveSiemSettings(RemoveSiemSettingsRequest {
                config_id: 43253,
                version: 7,
                enable_for_all_policies: false,
                enable_siem: false,
                enabled_botman_siem_events: false,
                siem_definition_id: None,
                firewall_policy_ids: None,
            }))
        );
    }

    #[tokio::test]
    async fn failed_update_call_assigns_no_id() {
        let mock = Arc::new(MockAppsec::new());
        mock.fail("UpdateSiemSettings", ApiError::status(400, "Invalid Input Error"));
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();

        let mut d = planned(&registry);
        let diags = registry.create(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.has_error());
        assert_eq!(
            diags.iter().next().unwrap().summary,
            "calling 'UpdateSiemSettings': API error 400: Invalid Input Error"
        );
        assert_eq!(d.id(), None);
    }

    #[tokio::test]
    async fn read_rejects_composite_id() {
        let mock = Arc::new(MockAppsec::new());
        let registry = registry(mock);
        let meta = OperationMeta::unconfigured();

        let mut d = planned(&registry).with_id("43253:7");
        let diags = registry.read(&meta, RESOURCE_TYPE, &mut d).await;
        assert_eq!(
            diags.iter().next().unwrap().summary,
            "ID '43253:7' incorrectly formatted: should be 'configID'"
        );
        assert_eq!(d.id(), Some("43253:7"));
    }

    #[tokio::test]
    async fn update_writes_to_cloned_version_when_latest_is_active() {
        let mock = Arc::new(MockAppsec::new());
        mock.configuration.lock().unwrap().production_version = Some(7);
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();

        let mut d = planned(&registry)
            .with_id("43253")
            .with_attribute("enable_siem", false);
        let diags = registry.update(&meta, RESOURCE_TYPE, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        let update = mock.calls().into_iter().find_map(|c| match c {
            Call::UpdateSiemSettings(request) => Some(request),
            _ => None,
        });
        assert_eq!(update.map(|r| (r.version, r.enable_siem)), Some((8, false)));
        assert_eq!(d.get("enable_siem"), Some(&Value::Bool(false)));
    }

    #[tokio::test]
    async fn replanning_created_config_changes_nothing() {
        let mock = Arc::new(MockAppsec::new());
        let registry = registry(mock);
        let meta = OperationMeta::unconfigured();
        let config = registry
            .new_resource_data(RESOURCE_TYPE)
            .unwrap()
            .with_attribute("config_id", Value::Int(43253))
            .with_attribute("enable_siem", true)
            .with_attribute("enable_for_all_policies", false)
            .with_attribute("siem_id", Value::Int(1))
            .with_attribute("security_policy_ids", vec!["12345".to_string()]);

        let mut state = config.clone();
        let diags = registry.create(&meta, RESOURCE_TYPE, &mut state).await;
        assert!(diags.is_empty(), "{:?}", diags);

        let plan = registry.plan(RESOURCE_TYPE, &state, &config);
        assert!(plan.diagnostics.is_empty(), "{:?}", plan.diagnostics);
        assert!(plan.changed.is_empty(), "{:?}", plan.changed);

        let plan = registry.plan(
            RESOURCE_TYPE,
            &state,
            &config.with_attribute("enable_botman_siem", true),
        );
        assert_eq!(plan.changed, vec!["enable_botman_siem"]);
    }
}
