//! Read-only views of a security configuration's latest version

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::id;
use edgeform_core::json_payload;
use edgeform_core::provider::{DataSource, ProviderError, ProviderResult};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};
use edgeform_core::version::ConfigVersionResolver;

use super::client::{Appsec, GetAttackPayloadLoggingRequest, VersionRequest};
use crate::{output, upstream};

pub(crate) fn all(
    client: &ClientAccessor<dyn Appsec>,
    versions: &Arc<dyn ConfigVersionResolver>,
) -> BTreeMap<String, Arc<dyn DataSource>> {
    let lookup = Lookup {
        client: client.clone(),
        versions: versions.clone(),
    };
    let mut data_sources: BTreeMap<String, Arc<dyn DataSource>> = BTreeMap::new();
    data_sources.insert(
        ATTACK_PAYLOAD_LOGGING.to_string(),
        Arc::new(AttackPayloadLoggingData(lookup.clone())),
    );
    data_sources.insert(
        SECURITY_POLICY.to_string(),
        Arc::new(SecurityPolicyData(lookup.clone())),
    );
    data_sources.insert(
        MATCH_TARGETS.to_string(),
        Arc::new(MatchTargetsData(lookup.clone())),
    );
    data_sources.insert(
        RATE_POLICIES.to_string(),
        Arc::new(RatePoliciesData(lookup.clone())),
    );
    data_sources.insert(
        SELECTED_HOSTNAMES.to_string(),
        Arc::new(SelectedHostnamesData(lookup)),
    );
    data_sources
}

const ATTACK_PAYLOAD_LOGGING: &str = "akamai_appsec_advanced_settings_attack_payload_logging";
const SECURITY_POLICY: &str = "akamai_appsec_security_policy";
const MATCH_TARGETS: &str = "akamai_appsec_match_targets";
const RATE_POLICIES: &str = "akamai_appsec_rate_policies";
const SELECTED_HOSTNAMES: &str = "akamai_appsec_selected_hostnames";

#[derive(Clone)]
struct Lookup {
    client: ClientAccessor<dyn Appsec>,
    versions: Arc<dyn ConfigVersionResolver>,
}

impl Lookup {
    /// Client, configuration ID and latest version for a read
    async fn resolve(
        &self,
        meta: &OperationMeta,
        d: &ResourceData,
    ) -> ProviderResult<(Arc<dyn Appsec>, i64, i64)> {
        let client = self.client.client(meta)?;
        let config_id = d.get_int("config_id")?;
        let version = self.versions.latest_version(meta, config_id).await?;
        Ok((client, config_id, version))
    }
}

fn base_schema(data_source_type: &str) -> ResourceSchema {
    ResourceSchema::new(data_source_type)
        .attribute(
            AttributeSchema::new("config_id", AttributeType::Int)
                .required()
                .with_description("Unique identifier of the security configuration"),
        )
        .attribute(
            AttributeSchema::new("json", AttributeType::String)
                .computed()
                .with_description("JSON representation"),
        )
        .attribute(
            AttributeSchema::new("output_text", AttributeType::String)
                .computed()
                .with_description("Text representation"),
        )
}

fn not_found(field: &str, value: impl ToString) -> ProviderError {
    ProviderError::InvalidValue {
        field: field.to_string(),
        message: format!("'{}' does not exist in this configuration", value.to_string()),
    }
}

// =============================================================================
// akamai_appsec_advanced_settings_attack_payload_logging
// =============================================================================

struct AttackPayloadLoggingData(Lookup);

#[async_trait]
impl DataSource for AttackPayloadLoggingData {
    fn schema(&self) -> ResourceSchema {
        base_schema(ATTACK_PAYLOAD_LOGGING)
            .with_description("Attack payload logging settings")
            .attribute(
                AttributeSchema::new("security_policy_id", AttributeType::String)
                    .optional()
                    .with_description("Policy whose overrides to read"),
            )
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", ATTACK_PAYLOAD_LOGGING);
        let (client, config_id, version) = self.0.resolve(meta, d).await?;
        let policy_id = d.get_optional_string("security_policy_id")?;

        let logging = client
            .get_attack_payload_logging(GetAttackPayloadLoggingRequest {
                config_id,
                version,
                policy_id: policy_id.clone(),
            })
            .await
            .map_err(upstream("GetAdvancedSettingsAttackPayloadLogging"))?;

        let text = output::table(
            "attack payload logging",
            &["ENABLED", "REQUEST BODY", "RESPONSE BODY"],
            &[vec![
                logging.enabled.to_string(),
                logging.request_body.body_type.clone(),
                logging.response_body.body_type.clone(),
            ]],
        );
        d.set_attrs([
            ("json", Value::from(json_payload::encode(&logging)?)),
            ("output_text", Value::from(text)),
        ])?;
        d.set_id(id::compose(&[
            config_id.to_string(),
            policy_id.unwrap_or_default(),
        ]));
        Ok(())
    }
}

// =============================================================================
// akamai_appsec_security_policy
// =============================================================================

struct SecurityPolicyData(Lookup);

#[async_trait]
impl DataSource for SecurityPolicyData {
    fn schema(&self) -> ResourceSchema {
        base_schema(SECURITY_POLICY)
            .with_description("Security policies of a configuration")
            .attribute(
                AttributeSchema::new("security_policy_name", AttributeType::String)
                    .optional()
                    .with_description("Name of the policy to look up"),
            )
            .attribute(AttributeSchema::new("security_policy_id", AttributeType::String).computed())
            .attribute(
                AttributeSchema::new("security_policy_id_list", types::string_list()).computed(),
            )
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", SECURITY_POLICY);
        let (client, config_id, version) = self.0.resolve(meta, d).await?;

        let policies = client
            .get_security_policies(VersionRequest { config_id, version })
            .await
            .map_err(upstream("GetSecurityPolicies"))?;

        let selected = match d.get_optional_string("security_policy_name")? {
            Some(name) => Some(
                policies
                    .policies
                    .iter()
                    .find(|p| p.policy_name == name)
                    .map(|p| p.policy_id.clone())
                    .ok_or_else(|| not_found("security_policy_name", &name))?,
            ),
            None => None,
        };

        let rows: Vec<Vec<String>> = policies
            .policies
            .iter()
            .map(|p| vec![p.policy_id.clone(), p.policy_name.clone()])
            .collect();
        let ids: Vec<String> = policies.policies.iter().map(|p| p.policy_id.clone()).collect();

        let mut fields = vec![
            ("json", Value::from(json_payload::encode(&policies)?)),
            (
                "output_text",
                Value::from(output::table("security policies", &["ID", "NAME"], &rows)),
            ),
            ("security_policy_id_list", Value::from(ids)),
        ];
        if let Some(policy_id) = selected {
            fields.push(("security_policy_id", Value::from(policy_id)));
        }
        d.set_attrs(fields)?;
        d.set_id(id::compose(&[config_id.to_string(), version.to_string()]));
        Ok(())
    }
}

// =============================================================================
// akamai_appsec_match_targets
// =============================================================================

struct MatchTargetsData(Lookup);

#[async_trait]
impl DataSource for MatchTargetsData {
    fn schema(&self) -> ResourceSchema {
        base_schema(MATCH_TARGETS)
            .with_description("Match targets of a configuration")
            .attribute(
                AttributeSchema::new("match_target_id", AttributeType::Int)
                    .optional()
                    .with_description("Only report this match target"),
            )
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", MATCH_TARGETS);
        let (client, config_id, version) = self.0.resolve(meta, d).await?;
        let wanted = d.get_optional_int("match_target_id")?;

        let targets = client
            .get_match_targets(VersionRequest { config_id, version })
            .await
            .map_err(upstream("GetMatchTargets"))?;

        let all: Vec<_> = targets
            .match_targets
            .website_targets
            .iter()
            .chain(&targets.match_targets.api_targets)
            .filter(|t| wanted.is_none_or(|id| t.target_id == id))
            .collect();
        if let Some(id) = wanted
            && all.is_empty()
        {
            return Err(not_found("match_target_id", id));
        }

        let json = match (wanted, all.as_slice()) {
            (Some(_), [target]) => json_payload::encode(target)?,
            _ => json_payload::encode(&targets)?,
        };
        let rows: Vec<Vec<String>> = all
            .iter()
            .map(|t| {
                vec![
                    t.target_id.to_string(),
                    t.target_type.clone(),
                    t.sequence.to_string(),
                    t.security_policy.policy_id.clone(),
                ]
            })
            .collect();

        d.set_attrs([
            ("json", Value::from(json)),
            (
                "output_text",
                Value::from(output::table(
                    "match targets",
                    &["ID", "TYPE", "SEQUENCE", "POLICY ID"],
                    &rows,
                )),
            ),
        ])?;
        d.set_id(config_id.to_string());
        Ok(())
    }
}

// =============================================================================
// akamai_appsec_rate_policies
// =============================================================================

struct RatePoliciesData(Lookup);

#[async_trait]
impl DataSource for RatePoliciesData {
    fn schema(&self) -> ResourceSchema {
        base_schema(RATE_POLICIES)
            .with_description("Rate policies of a configuration")
            .attribute(
                AttributeSchema::new("rate_policy_id", AttributeType::Int)
                    .optional()
                    .with_description("Only report this rate policy"),
            )
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RATE_POLICIES);
        let (client, config_id, version) = self.0.resolve(meta, d).await?;
        let wanted = d.get_optional_int("rate_policy_id")?;

        let policies = client
            .get_rate_policies(VersionRequest { config_id, version })
            .await
            .map_err(upstream("GetRatePolicies"))?;

        let json = match wanted {
            Some(id) => {
                let policy = policies
                    .rate_policies
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| not_found("rate_policy_id", id))?;
                json_payload::encode(policy)?
            }
            None => json_payload::encode(&policies)?,
        };
        let rows: Vec<Vec<String>> = policies
            .rate_policies
            .iter()
            .filter(|p| wanted.is_none_or(|id| p.id == id))
            .map(|p| vec![p.id.to_string(), p.name.clone()])
            .collect();

        d.set_attrs([
            ("json", Value::from(json)),
            (
                "output_text",
                Value::from(output::table("rate policies", &["ID", "NAME"], &rows)),
            ),
        ])?;
        d.set_id(config_id.to_string());
        Ok(())
    }
}

// =============================================================================
// akamai_appsec_selected_hostnames
// =============================================================================

struct SelectedHostnamesData(Lookup);

#[async_trait]
impl DataSource for SelectedHostnamesData {
    fn schema(&self) -> ResourceSchema {
        base_schema(SELECTED_HOSTNAMES)
            .with_description("Hostnames protected by a configuration")
            .attribute(AttributeSchema::new("hostnames", types::string_list()).computed())
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", SELECTED_HOSTNAMES);
        let (client, config_id, version) = self.0.resolve(meta, d).await?;

        let selected = client
            .get_selected_hostnames(VersionRequest { config_id, version })
            .await
            .map_err(upstream("GetSelectedHostnames"))?;

        let hostnames: Vec<String> = selected
            .hostname_list
            .iter()
            .map(|h| h.hostname.clone())
            .collect();
        let rows: Vec<Vec<String>> = hostnames.iter().map(|h| vec![h.clone()]).collect();

        d.set_attrs([
            ("hostnames", Value::from(hostnames)),
            ("json", Value::from(json_payload::encode(&selected)?)),
            (
                "output_text",
                Value::from(output::table("selected hostnames", &["HOSTNAME"], &rows)),
            ),
        ])?;
        d.set_id(config_id.to_string());
        Ok(())
    }
}
