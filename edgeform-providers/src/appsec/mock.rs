use std::sync::Mutex;

use async_trait::async_trait;
use edgeform_core::client::ApiError;

use super::client::*;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetConfiguration(GetConfigurationRequest),
    CloneVersion(CreateConfigurationVersionCloneRequest),
    GetSiemSettings(GetSiemSettingsRequest),
    UpdateSiemSettings(UpdateSiemSettingsRequest),
    RemoveSiemSettings(RemoveSiemSettingsRequest),
    GetAttackPayloadLogging(GetAttackPayloadLoggingRequest),
    GetSecurityPolicies(VersionRequest),
    GetMatchTargets(VersionRequest),
    GetRatePolicies(VersionRequest),
    GetSelectedHostnames(VersionRequest),
}

/// In-memory appsec API holding configuration 43253 at version 7
pub(crate) struct MockAppsec {
    calls: Mutex<Vec<Call>>,
    pub configuration: Mutex<GetConfigurationResponse>,
    pub siem: Mutex<SiemSettings>,
    pub attack_payload_logging: AttackPayloadLogging,
    pub security_policies: SecurityPolicies,
    pub match_targets: MatchTargets,
    pub rate_policies: RatePolicies,
    pub selected_hostnames: SelectedHostnames,
    /// Error returned by every operation whose name is listed
    pub failures: Mutex<Vec<(&'static str, ApiError)>>,
}

impl MockAppsec {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            configuration: Mutex::new(GetConfigurationResponse {
                id: 43253,
                name: "Akamai Tools".to_string(),
                description: Some("Akamai Tools".to_string()),
                latest_version: 7,
                staging_version: Some(5),
                production_version: Some(4),
            }),
            siem: Mutex::new(SiemSettings {
                enable_for_all_policies: false,
                enable_siem: true,
                enabled_botman_siem_events: true,
                siem_definition_id: 1,
                firewall_policy_ids: vec!["12345".to_string()],
            }),
            attack_payload_logging: AttackPayloadLogging {
                enabled: true,
                request_body: PayloadBodyLogging {
                    body_type: "ATTACK_PAYLOAD".to_string(),
                },
                response_body: PayloadBodyLogging {
                    body_type: "NONE".to_string(),
                },
            },
            security_policies: SecurityPolicies {
                config_id: 43253,
                version: 7,
                policies: vec![
                    SecurityPolicy {
                        policy_id: "PLE_114049".to_string(),
                        policy_name: "APIs".to_string(),
                        has_rate_policy_with_api_key: Some(false),
                    },
                    SecurityPolicy {
                        policy_id: "test_policy".to_string(),
                        policy_name: "Test Policy".to_string(),
                        has_rate_policy_with_api_key: None,
                    },
                ],
            },
            match_targets: MatchTargets {
                match_targets: MatchTargetGroups {
                    website_targets: vec![MatchTarget {
                        target_id: 3008967,
                        target_type: "website".to_string(),
                        sequence: 1,
                        security_policy: PolicyReference {
                            policy_id: "PLE_114049".to_string(),
                        },
                    }],
                    api_targets: vec![MatchTarget {
                        target_id: 3008968,
                        target_type: "api".to_string(),
                        sequence: 2,
                        security_policy: PolicyReference {
                            policy_id: "test_policy".to_string(),
                        },
                    }],
                },
            },
            rate_policies: RatePolicies {
                rate_policies: vec![RatePolicy {
                    id: 135355,
                    name: "Page View Requests".to_string(),
                    match_type: "path".to_string(),
                    average_threshold: 12,
                    burst_threshold: 18,
                }],
            },
            selected_hostnames: SelectedHostnames {
                hostname_list: vec![
                    Hostname {
                        hostname: "rinaldi.sandbox.akamaideveloper.com".to_string(),
                    },
                    Hostname {
                        hostname: "sujala.sandbox.akamaideveloper.com".to_string(),
                    },
                ],
            },
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self, operation: &'static str, error: ApiError) {
        self.failures.lock().unwrap().push((operation, error));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| *name == operation)
        {
            Some((_, error)) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Appsec for MockAppsec {
    async fn get_configuration(
        &self,
        request: GetConfigurationRequest,
    ) -> Result<GetConfigurationResponse, ApiError> {
        self.record("GetConfiguration", Call::GetConfiguration(request))?;
        Ok(self.configuration.lock().unwrap().clone())
    }

    async fn create_configuration_version_clone(
        &self,
        request: CreateConfigurationVersionCloneRequest,
    ) -> Result<CreateConfigurationVersionCloneResponse, ApiError> {
        let config_id = request.config_id;
        self.record("CreateConfigurationVersionClone", Call::CloneVersion(request))?;
        let mut configuration = self.configuration.lock().unwrap();
        configuration.latest_version += 1;
        Ok(CreateConfigurationVersionCloneResponse {
            config_id,
            version: configuration.latest_version,
        })
    }

    async fn get_siem_settings(
        &self,
        request: GetSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError> {
        self.record("GetSiemSettings", Call::GetSiemSettings(request))?;
        Ok(self.siem.lock().unwrap().clone())
    }

    async fn update_siem_settings(
        &self,
        request: UpdateSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError> {
        let settings = SiemSettings {
            enable_for_all_policies: request.enable_for_all_policies,
            enable_siem: request.enable_siem,
            enabled_botman_siem_events: request.enabled_botman_siem_events,
            siem_definition_id: request.siem_definition_id,
            firewall_policy_ids: request.firewall_policy_ids.clone(),
        };
        self.record("UpdateSiemSettings", Call::UpdateSiemSettings(request))?;
        *self.siem.lock().unwrap() = settings.clone();
        Ok(settings)
    }

    async fn remove_siem_settings(
        &self,
        request: RemoveSiemSettingsRequest,
    ) -> Result<SiemSettings, ApiError> {
        self.record("RemoveSiemSettings", Call::RemoveSiemSettings(request))?;
        let mut siem = self.siem.lock().unwrap();
        *siem = SiemSettings::default();
        Ok(siem.clone())
    }

    async fn get_attack_payload_logging(
        &self,
        request: GetAttackPayloadLoggingRequest,
    ) -> Result<AttackPayloadLogging, ApiError> {
        self.record(
            "GetAdvancedSettingsAttackPayloadLogging",
            Call::GetAttackPayloadLogging(request),
        )?;
        Ok(self.attack_payload_logging.clone())
    }

    async fn get_security_policies(
        &self,
        request: VersionRequest,
    ) -> Result<SecurityPolicies, ApiError> {
        self.record("GetSecurityPolicies", Call::GetSecurityPolicies(request))?;
        Ok(self.security_policies.clone())
    }

    async fn get_match_targets(&self, request: VersionRequest) -> Result<MatchTargets, ApiError> {
        self.record("GetMatchTargets", Call::GetMatchTargets(request))?;
        Ok(self.match_targets.clone())
    }

    async fn get_rate_policies(&self, request: VersionRequest) -> Result<RatePolicies, ApiError> {
        self.record("GetRatePolicies", Call::GetRatePolicies(request))?;
        Ok(self.rate_policies.clone())
    }

    async fn get_selected_hostnames(
        &self,
        request: VersionRequest,
    ) -> Result<SelectedHostnames, ApiError> {
        self.record("GetSelectedHostnames", Call::GetSelectedHostnames(request))?;
        Ok(self.selected_hostnames.clone())
    }
}
