//! Image and video policies
//!
//! A policy is written to staging and, when `activate_on_production` is
//! set, to production as well. The `.auto` policy exists in every policy
//! set and cannot be removed.

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::id;
use edgeform_core::json_payload;
use edgeform_core::provider::{ProviderResult, Resource, verify_unchanged};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{
    AttributeSchema, AttributeType, ResourceSchema, suppress_equivalent_json, types,
};

use super::MediaKind;
use super::client::{Imaging, Network, PolicyRequest, UpsertPolicyRequest};
use crate::upstream;

const ID_HINT: &str = "policySetID:policyID";
const AUTO_POLICY: &str = ".auto";

/// Keys the service adds to every stored policy
const SERVER_KEYS: &[&str] = &["id", "version", "dateCreated", "user", "previousVersion"];

pub(crate) struct PolicyResource {
    pub(crate) kind: MediaKind,
    pub(crate) client: ClientAccessor<dyn Imaging>,
}

fn request(d: &ResourceData, network: Network) -> ProviderResult<PolicyRequest> {
    let parts = match d.id() {
        Some(id) => id::decompose(id, 2, ID_HINT)?,
        None => vec![d.get_string("policyset_id")?, d.get_string("policy_id")?],
    };
    Ok(PolicyRequest {
        network,
        contract_id: d.get_string("contract_id")?,
        policy_set_id: parts[0].clone(),
        policy_id: parts[1].clone(),
    })
}

fn networks(d: &ResourceData) -> ProviderResult<Vec<Network>> {
    Ok(if d.get_bool("activate_on_production")? {
        vec![Network::Staging, Network::Production]
    } else {
        vec![Network::Staging]
    })
}

impl PolicyResource {
    async fn upsert(&self, meta: &OperationMeta, d: &ResourceData) -> ProviderResult<()> {
        let client = self.client.client(meta)?;
        let json_payload = json_payload::extract(d, "json", None)?;
        for network in networks(d)? {
            client
                .upsert_policy(UpsertPolicyRequest {
                    target: request(d, network)?,
                    json_payload: json_payload.clone(),
                })
                .await
                .map_err(upstream("UpsertPolicy"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for PolicyResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.kind.policy_type())
            .with_description(format!("{} policy of a policy set", self.kind.label()))
            .attribute(AttributeSchema::new("policy_id", AttributeType::String).required())
            .attribute(AttributeSchema::new("policyset_id", AttributeType::String).required())
            .attribute(AttributeSchema::new("contract_id", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("activate_on_production", AttributeType::Bool)
                    .optional()
                    .with_default(Value::Bool(false))
                    .with_description("Whether the policy is also written to production"),
            )
            .attribute(
                AttributeSchema::new("json", types::json_string())
                    .required()
                    .with_diff_suppress(suppress_equivalent_json),
            )
            .attribute(AttributeSchema::new("version", AttributeType::Int).computed())
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", self.kind.policy_type());
        self.upsert(meta, d).await?;
        let id = id::compose(&[d.get_string("policyset_id")?, d.get_string("policy_id")?]);
        d.set_id(id);
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", self.kind.policy_type());
        let client = self.client.client(meta)?;
        let network = networks(d)?.pop().unwrap_or(Network::Staging);
        let target = request(d, network)?;

        let policy = match client.get_policy(target.clone()).await {
            Ok(policy) => policy,
            Err(err) if err.is_not_found() => {
                d.clear_id();
                return Ok(());
            }
            Err(err) => return Err(upstream("GetPolicy")(err)),
        };

        let version = policy.get("version").and_then(serde_json::Value::as_i64);
        let mut fields = vec![
            ("policyset_id", Value::from(target.policy_set_id)),
            ("policy_id", Value::from(target.policy_id)),
            (
                "json",
                Value::from(json_payload::strip_and_encode(policy, SERVER_KEYS)?),
            ),
        ];
        if let Some(version) = version {
            fields.push(("version", Value::Int(version)));
        }
        d.set_attrs(fields)
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", self.kind.policy_type());
        self.upsert(meta, d).await?;
        self.read(meta, d).await
    }

    async fn delete(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", self.kind.policy_type());
        let staging = request(d, Network::Staging)?;
        if staging.policy_id == AUTO_POLICY {
            log::info!(
                "Image and Video Manager API does not support '.auto' policy deletion - \
                 it will only be removed from state"
            );
            return Ok(());
        }

        let client = self.client.client(meta)?;
        for network in networks(d)? {
            match client.delete_policy(request(d, network)?).await {
                Err(err) if !err.is_not_found() => return Err(upstream("DeletePolicy")(err)),
                _ => {}
            }
        }
        Ok(())
    }

    async fn import(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} import", self.kind.policy_type());
        let parts = id::decompose(d.require_id()?, 3, "policySetID:policyID:contractID")?;
        d.set_attrs([
            ("policyset_id", Value::from(parts[0].clone())),
            ("policy_id", Value::from(parts[1].clone())),
            ("contract_id", Value::from(parts[2].clone())),
        ])?;
        d.set_id(id::compose(&parts[..2]));
        self.read(meta, d).await
    }

    fn customize_diff(&self, old: &ResourceData, new: &ResourceData) -> ProviderResult<()> {
        for field in ["policy_id", "policyset_id", "contract_id"] {
            verify_unchanged(old, new, field)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::ImagingProvider;
    use super::super::mock::{Call, MockImaging};
    use super::*;
    use edgeform_core::ProviderRegistry;

    const POLICY: &str = r#"{"breakpoints": {"widths": [320, 640, 1024]}, "output": {"perceptualQuality": "mediumHigh"}}"#;

    fn registry(mock: Arc<MockImaging>) -> ProviderRegistry {
        ProviderRegistry::builder()
            .subprovider(Arc::new(ImagingProvider::with_client(mock)))
            .build()
            .unwrap()
    }

    fn planned(registry: &ProviderRegistry, policy_id: &str) -> ResourceData {
        registry
            .new_resource_data(MediaKind::Image.policy_type())
            .unwrap()
            .with_attribute("policy_id", policy_id)
            .with_attribute("policyset_id", "570f9090")
            .with_attribute("contract_id", "3-WNKXX1")
            .with_attribute("json", POLICY)
    }

    fn upserted_networks(mock: &MockImaging) -> Vec<Network> {
        mock.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UpsertPolicy(request) => Some(request.target.network),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn create_on_staging_strips_server_keys() {
        let mock = Arc::new(MockImaging::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();
        let resource_type = MediaKind::Image.policy_type();

        let mut d = planned(&registry, "thumbnail");
        let diags = registry.create(&meta, resource_type, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(d.id(), Some("570f9090:thumbnail"));
        assert_eq!(upserted_networks(&mock), vec![Network::Staging]);
        assert_eq!(d.get_int("version").unwrap(), 1);
        assert_eq!(
            d.get_string("json").unwrap(),
            r#"{"breakpoints":{"widths":[320,640,1024]},"output":{"perceptualQuality":"mediumHigh"}}"#
        );

        let plan = registry.plan(resource_type, &d, &planned(&registry, "thumbnail"));
        assert!(!plan.changed.contains(&"json".to_string()));
    }

    #[tokio::test]
    async fn production_activation_writes_both_networks() {
        let mock = Arc::new(MockImaging::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();
        let resource_type = MediaKind::Image.policy_type();

        let mut d =
            planned(&registry, "thumbnail").with_attribute("activate_on_production", true);
        let diags = registry.create(&meta, resource_type, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(
            upserted_networks(&mock),
            vec![Network::Staging, Network::Production]
        );

        let diags = registry.delete(&meta, resource_type, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert!(mock.policies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn auto_policy_delete_is_local_only() {
        let mock = Arc::new(MockImaging::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();
        let resource_type = MediaKind::Image.policy_type();

        let mut d = planned(&registry, AUTO_POLICY);
        registry.create(&meta, resource_type, &mut d).await;
        let diags = registry.delete(&meta, resource_type, &mut d).await;
        assert!(diags.is_empty(), "{:?}", diags);
        assert_eq!(d.id(), None);
        assert!(
            !mock
                .calls()
                .iter()
                .any(|call| matches!(call, Call::DeletePolicy(_)))
        );
        assert_eq!(mock.policies.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn import_with_contract() {
        let mock = Arc::new(MockImaging::new());
        let registry = registry(mock.clone());
        let meta = OperationMeta::unconfigured();
        let resource_type = MediaKind::Image.policy_type();

        let mut d = planned(&registry, "thumbnail");
        registry.create(&meta, resource_type, &mut d).await;

        let (imported, diags) = registry
            .import(&meta, resource_type, "570f9090:thumbnail:3-WNKXX1")
            .await;
        assert!(diags.is_empty(), "{:?}", diags);
        let imported = imported.unwrap();
        assert_eq!(imported.id(), Some("570f9090:thumbnail"));
        assert_eq!(imported.get_string("json").unwrap(), d.get_string("json").unwrap());
    }
}
