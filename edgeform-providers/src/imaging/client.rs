//! Image and video manager API client
//!
//! Policies are free-form JSON documents addressed by network, policy set
//! and policy ID; the contract and policy set travel as headers.

use std::fmt;

use async_trait::async_trait;
use edgeform_core::client::{ApiError, ApiRequest, Method, Session};
use serde::{Deserialize, Serialize};

pub type JsonObject = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Staging,
    Production,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Staging => write!(f, "staging"),
            Network::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Policy sets
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicySet {
    pub id: String,
    pub name: String,
    pub region: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePolicySet {
    pub name: String,
    pub region: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePolicySet {
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySetRequest {
    pub policy_set_id: String,
    pub contract_id: String,
}

// =============================================================================
// Policies
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRequest {
    pub network: Network,
    pub contract_id: String,
    pub policy_set_id: String,
    pub policy_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertPolicyRequest {
    pub target: PolicyRequest,
    pub json_payload: Vec<u8>,
}

#[async_trait]
pub trait Imaging: Send + Sync {
    async fn get_policy_set(&self, request: PolicySetRequest) -> Result<PolicySet, ApiError>;

    async fn create_policy_set(
        &self,
        contract_id: &str,
        request: CreatePolicySet,
    ) -> Result<PolicySet, ApiError>;

    async fn update_policy_set(
        &self,
        target: PolicySetRequest,
        request: UpdatePolicySet,
    ) -> Result<PolicySet, ApiError>;

    async fn delete_policy_set(&self, request: PolicySetRequest) -> Result<(), ApiError>;

    async fn get_policy(&self, request: PolicyRequest) -> Result<JsonObject, ApiError>;

    async fn upsert_policy(&self, request: UpsertPolicyRequest) -> Result<(), ApiError>;

    async fn delete_policy(&self, request: PolicyRequest) -> Result<(), ApiError>;
}

/// Imaging client over an authenticated session
pub struct HttpImaging {
    session: Session,
}

impl HttpImaging {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

fn policy_set_request(method: Method, target: &PolicySetRequest) -> ApiRequest {
    ApiRequest::new(method, format!("/imaging/v2/policysets/{}", target.policy_set_id))
        .header("Contract", target.contract_id.clone())
}

fn policy_request(method: Method, target: &PolicyRequest) -> ApiRequest {
    let path = format!(
        "/imaging/v2/network/{}/policies/{}",
        target.network, target.policy_id
    );
    ApiRequest::new(method, path)
        .header("Contract", target.contract_id.clone())
        .header("Policy-Set", target.policy_set_id.clone())
}

#[async_trait]
impl Imaging for HttpImaging {
    async fn get_policy_set(&self, request: PolicySetRequest) -> Result<PolicySet, ApiError> {
        self.session
            .exec_json(policy_set_request(Method::Get, &request))
            .await
    }

    async fn create_policy_set(
        &self,
        contract_id: &str,
        request: CreatePolicySet,
    ) -> Result<PolicySet, ApiError> {
        self.session
            .exec_json(
                ApiRequest::post("/imaging/v2/policysets/")
                    .header("Contract", contract_id)
                    .json_body(&request)?,
            )
            .await
    }

    async fn update_policy_set(
        &self,
        target: PolicySetRequest,
        request: UpdatePolicySet,
    ) -> Result<PolicySet, ApiError> {
        self.session
            .exec_json(policy_set_request(Method::Put, &target).json_body(&request)?)
            .await
    }

    async fn delete_policy_set(&self, request: PolicySetRequest) -> Result<(), ApiError> {
        self.session
            .exec_empty(policy_set_request(Method::Delete, &request))
            .await
    }

    async fn get_policy(&self, request: PolicyRequest) -> Result<JsonObject, ApiError> {
        self.session
            .exec_json(policy_request(Method::Get, &request))
            .await
    }

    async fn upsert_policy(&self, request: UpsertPolicyRequest) -> Result<(), ApiError> {
        self.session
            .exec_empty(
                policy_request(Method::Put, &request.target)
                    .header("Content-Type", "application/json")
                    .raw_body(request.json_payload),
            )
            .await
    }

    async fn delete_policy(&self, request: PolicyRequest) -> Result<(), ApiError> {
        self.session
            .exec_empty(policy_request(Method::Delete, &request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeform_core::testing::RecordingTransport;

    fn header<'a>(request: &'a ApiRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn upsert_policy_addresses_network_and_headers() {
        let transport = RecordingTransport::new();
        let client = HttpImaging::new(transport.session());

        client
            .upsert_policy(UpsertPolicyRequest {
                target: PolicyRequest {
                    network: Network::Production,
                    contract_id: "3-WNKXX1".to_string(),
                    policy_set_id: "570f9090-5dbe-11ec-8a0a-71665789c1d8".to_string(),
                    policy_id: "thumbnail".to_string(),
                },
                json_payload: br#"{"breakpoints":{"widths":[320,640]}}"#.to_vec(),
            })
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.path, "/imaging/v2/network/production/policies/thumbnail");
        assert_eq!(header(sent, "Contract"), Some("3-WNKXX1"));
        assert_eq!(
            header(sent, "Policy-Set"),
            Some("570f9090-5dbe-11ec-8a0a-71665789c1d8")
        );
    }

    #[tokio::test]
    async fn create_policy_set_body() {
        let transport = RecordingTransport::new();
        transport.respond_json(serde_json::json!({
            "id": "570f9090-5dbe-11ec-8a0a-71665789c1d8",
            "name": "media",
            "region": "EMEA",
            "type": "IMAGE",
        }));
        let client = HttpImaging::new(transport.session());

        let created = client
            .create_policy_set(
                "3-WNKXX1",
                CreatePolicySet {
                    name: "media".to_string(),
                    region: "EMEA".to_string(),
                    media_type: "IMAGE".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(created.id, "570f9090-5dbe-11ec-8a0a-71665789c1d8");

        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "/imaging/v2/policysets/");
        let body: serde_json::Value = serde_json::from_slice(sent.body.as_ref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"name": "media", "region": "EMEA", "type": "IMAGE"})
        );
    }
}
