//! Application security API client

use async_trait::async_trait;
use edgeform_core::client::{ApiError, ApiRequest, Session};
use serde::{Deserialize, Serialize};

// =============================================================================
// Requests and responses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetConfigurationRequest {
    pub config_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConfigurationResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub latest_version: i64,
    #[serde(default)]
    pub staging_version: Option<i64>,
    #[serde(default)]
    pub production_version: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateConfigurationVersionCloneRequest {
    pub config_id: i64,
    pub create_from_version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigurationVersionCloneResponse {
    pub config_id: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetSiemSettingsRequest {
    pub config_id: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiemSettings {
    pub enable_for_all_policies: bool,
    pub enable_siem: bool,
    #[serde(default)]
    pub enabled_botman_siem_events: bool,
    #[serde(default)]
    pub siem_definition_id: i64,
    #[serde(default)]
    pub firewall_policy_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateSiemSettingsRequest {
    pub config_id: i64,
    pub version: i64,
    pub enable_for_all_policies: bool,
    pub enable_siem: bool,
    pub enabled_botman_siem_events: bool,
    pub siem_definition_id: i64,
    pub firewall_policy_ids: Vec<String>,
}

/// Disabling request; SIEM cannot be deleted, only switched off
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemoveSiemSettingsRequest {
    pub config_id: i64,
    pub version: i64,
    pub enable_for_all_policies: bool,
    pub enable_siem: bool,
    pub enabled_botman_siem_events: bool,
    pub siem_definition_id: Option<i64>,
    pub firewall_policy_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiemBody<'a> {
    enable_for_all_policies: bool,
    enable_siem: bool,
    enabled_botman_siem_events: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    siem_definition_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    firewall_policy_ids: Option<&'a [String]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetAttackPayloadLoggingRequest {
    pub config_id: i64,
    pub version: i64,
    /// Policy-level settings when set, configuration-level otherwise
    pub policy_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPayloadLogging {
    pub enabled: bool,
    #[serde(default)]
    pub request_body: PayloadBodyLogging,
    #[serde(default)]
    pub response_body: PayloadBodyLogging,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayloadBodyLogging {
    #[serde(rename = "type", default)]
    pub body_type: String,
}

/// Request shape shared by the per-version list endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequest {
    pub config_id: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicies {
    #[serde(default)]
    pub config_id: i64,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub policies: Vec<SecurityPolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicy {
    pub policy_id: String,
    pub policy_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_rate_policy_with_api_key: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTargets {
    #[serde(default)]
    pub match_targets: MatchTargetGroups,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTargetGroups {
    #[serde(default)]
    pub website_targets: Vec<MatchTarget>,
    #[serde(default)]
    pub api_targets: Vec<MatchTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTarget {
    pub target_id: i64,
    #[serde(rename = "type", default)]
    pub target_type: String,
    #[serde(default)]
    pub sequence: i64,
    #[serde(default)]
    pub security_policy: PolicyReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyReference {
    #[serde(default)]
    pub policy_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePolicies {
    #[serde(default)]
    pub rate_policies: Vec<RatePolicy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePolicy {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub match_type: String,
    #[serde(default)]
    pub average_threshold: i64,
    #[serde(default)]
    pub burst_threshold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedHostnames {
    #[serde(default)]
    pub hostname_list: Vec<Hostname>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Hostname {
    pub hostname: String,
}

// =============================================================================
// Client
// =============================================================================

#[async_trait]
pub trait Appsec: Send + Sync {
    async fn get_configuration(
        &self,
        request: GetConfigurationRequest,
    ) -> Result<GetConfigurationResponse, ApiError>;

    async fn create_configuration_version_clone(
        &self,
        request: CreateConfigurationVersionCloneRequest,
    ) -> Result<CreateConfigurationVersionCloneResponse, ApiError>;

    async fn get_siem_settings(
        &self,
        request: GetSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError>;

    async fn update_siem_settings(
        &self,
        request: UpdateSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError>;

    async fn remove_siem_settings(
        &self,
        request: RemoveSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError>;

    async fn get_attack_payload_logging(
        &self,
        request: GetAttackPayloadLoggingRequest,
    ) -> Result<AttackPayloadLogging, ApiError>;

    async fn get_security_policies(
        &self,
        request: VersionRequest,
    ) -> Result<SecurityPolicies, ApiError>;

    async fn get_match_targets(&self, request: VersionRequest) -> Result<MatchTargets, ApiError>;

    async fn get_rate_policies(&self, request: VersionRequest) -> Result<RatePolicies, ApiError>;

    async fn get_selected_hostnames(
        &self,
        request: VersionRequest,
    ) -> Result<SelectedHostnames, ApiError>;
}

/// Appsec client over an authenticated session
pub struct HttpAppsec {
    session: Session,
}

impl HttpAppsec {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

fn version_path(config_id: i64, version: i64, suffix: &str) -> String {
    format!(
        "/appsec/v1/configs/{}/versions/{}/{}",
        config_id, version, suffix
    )
}

#[async_trait]
impl Appsec for HttpAppsec {
    async fn get_configuration(
        &self,
        request: GetConfigurationRequest,
    ) -> Result<GetConfigurationResponse, ApiError> {
        self.session
            .exec_json(ApiRequest::get(format!(
                "/appsec/v1/configs/{}",
                request.config_id
            )))
            .await
    }

    async fn create_configuration_version_clone(
        &self,
        request: CreateConfigurationVersionCloneRequest,
    ) -> Result<CreateConfigurationVersionCloneResponse, ApiError> {
        let body = serde_json::json!({
            "createFromVersion": request.create_from_version,
            "ruleUpdate": false,
        });
        self.session
            .exec_json(
                ApiRequest::post(format!("/appsec/v1/configs/{}/versions", request.config_id))
                    .json_body(&body)?,
            )
            .await
    }

    async fn get_siem_settings(
        &self,
        request: GetSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError> {
        self.session
            .exec_json(ApiRequest::get(version_path(
                request.config_id,
                request.version,
                "siem",
            )))
            .await
    }

    async fn update_siem_settings(
        &self,
        request: UpdateSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError> {
        let body = SiemBody {
            enable_for_all_policies: request.enable_for_all_policies,
            enable_siem: request.enable_siem,
            enabled_botman_siem_events: request.enabled_botman_siem_events,
            siem_definition_id: Some(request.siem_definition_id),
            firewall_policy_ids: Some(&request.firewall_policy_ids),
        };
        self.session
            .exec_json(
                ApiRequest::put(version_path(request.config_id, request.version, "siem"))
                    .json_body(&body)?,
            )
            .await
    }

    async fn remove_siem_settings(
        &self,
        request: RemoveSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError> {
        let body = SiemBody {
            enable_for_all_policies: request.enable_for_all_policies,
            enable_siem: request.enable_siem,
            enabled_botman_siem_events: request.enabled_botman_siem_events,
            siem_definition_id: request.siem_definition_id,
            firewall_policy_ids: request.firewall_policy_ids.as_deref(),
        };
        self.session
            .exec_json(
                ApiRequest::put(version_path(request.config_id, request.version, "siem"))
                    .json_body(&body)?,
            )
            .await
    }

    async fn get_attack_payload_logging(
        &self,
        request: GetAttackPayloadLoggingRequest,
    ) -> Result<AttackPayloadLogging, ApiError> {
        let suffix = match &request.policy_id {
            Some(policy_id) => format!(
                "security-policies/{}/advanced-settings/logging/attack-payload",
                policy_id
            ),
            None => "advanced-settings/logging/attack-payload".to_string(),
        };
        self.session
            .exec_json(ApiRequest::get(version_path(
                request.config_id,
                request.version,
                &suffix,
            )))
            .await
    }

    async fn get_security_policies(
        &self,
        request: VersionRequest,
    ) -> Result<SecurityPolicies, ApiError> {
        self.session
            .exec_json(ApiRequest::get(version_path(
                request.config_id,
                request.version,
                "security-policies",
            )))
            .await
    }

    async fn get_match_targets(&self, request: VersionRequest) -> Result<MatchTargets, ApiError> {
        self.session
            .exec_json(ApiRequest::get(version_path(
                request.config_id,
                request.version,
                "match-targets",
            )))
            .await
    }

    async fn get_rate_policies(&self, request: VersionRequest) -> Result<RatePolicies, ApiError> {
        self.session
            .exec_json(ApiRequest::get(version_path(
                request.config_id,
                request.version,
                "rate-policies",
            )))
            .await
    }

    async fn get_selected_hostnames(
        &self,
        request: VersionRequest,
    ) -> Result<SelectedHostnames, ApiError> {
        self.session
            .exec_json(ApiRequest::get(version_path(
                request.config_id,
                request.version,
                "selected-hostnames",
            )))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeform_core::client::Method;
    use edgeform_core::testing::RecordingTransport;

    #[tokio::test]
    async fn clone_posts_source_version() {
        let transport = RecordingTransport::new();
        transport.respond_json(serde_json::json!({"configId": 43253, "version": 8}));
        let client = HttpAppsec::new(transport.session());

        let response = client
            .create_configuration_version_clone(CreateConfigurationVersionCloneRequest {
                config_id: 43253,
                create_from_version: 7,
            })
            .await
            .unwrap();
        assert_eq!(response.version, 8);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.path, "/appsec/v1/configs/43253/versions");
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"createFromVersion": 7, "ruleUpdate": false})
        );
    }

    #[tokio::test]
    async fn remove_siem_omits_policy_ids() {
        let transport = RecordingTransport::new();
        transport.respond_json(serde_json::json!({
            "enableForAllPolicies": false,
            "enableSiem": false,
        }));
        let client = HttpAppsec::new(transport.session());

        client
            .remove_siem_settings(RemoveSiemSettingsRequest {
                config_id: 43253,
                version: 7,
                ..Default::default()
            })
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.path, "/appsec/v1/configs/43253/versions/7/siem");
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "enableForAllPolicies": false,
                "enableSiem": false,
                "enabledBotmanSiemEvents": false,
            })
        );
    }

    #[tokio::test]
    async fn attack_payload_logging_path_depends_on_policy() {
        let transport = RecordingTransport::new();
        transport.respond_json(serde_json::json!({"enabled": true}));
        transport.respond_json(serde_json::json!({"enabled": false}));
        let client = HttpAppsec::new(transport.session());

        for policy_id in [None, Some("test_policy".to_string())] {
            client
                .get_attack_payload_logging(GetAttackPayloadLoggingRequest {
                    config_id: 43253,
                    version: 7,
                    policy_id,
                })
                .await
                .unwrap();
        }

        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/appsec/v1/configs/43253/versions/7/advanced-settings/logging/attack-payload",
                "/appsec/v1/configs/43253/versions/7/security-policies/test_policy/advanced-settings/logging/attack-payload",
            ]
        );
    }
}
