use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use edgeform_core::client::ApiError;
use serde_json::Value as JsonValue;

use super::client::*;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetPolicySet(PolicySetRequest),
    CreatePolicySet(String, CreatePolicySet),
    UpdatePolicySet(PolicySetRequest, UpdatePolicySet),
    DeletePolicySet(PolicySetRequest),
    GetPolicy(PolicyRequest),
    UpsertPolicy(UpsertPolicyRequest),
    DeletePolicy(PolicyRequest),
}

/// In-memory imaging API
///
/// Stored policies gain the bookkeeping fields the real service adds.
#[derive(Default)]
pub(crate) struct MockImaging {
    calls: Mutex<Vec<Call>>,
    pub policy_sets: Mutex<HashMap<String, PolicySet>>,
    /// Policies keyed by (network, policy set, policy)
    pub policies: Mutex<HashMap<(String, String, String), JsonObject>>,
}

fn policy_key(target: &PolicyRequest) -> (String, String, String) {
    (
        target.network.to_string(),
        target.policy_set_id.clone(),
        target.policy_id.clone(),
    )
}

impl MockImaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Imaging for MockImaging {
    async fn get_policy_set(&self, request: PolicySetRequest) -> Result<PolicySet, ApiError> {
        self.record(Call::GetPolicySet(request.clone()));
        self.policy_sets
            .lock()
            .unwrap()
            .get(&request.policy_set_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Policy set not found"))
    }

    async fn create_policy_set(
        &self,
        contract_id: &str,
        request: CreatePolicySet,
    ) -> Result<PolicySet, ApiError> {
        self.record(Call::CreatePolicySet(contract_id.to_string(), request.clone()));
        let mut sets = self.policy_sets.lock().unwrap();
        let created = PolicySet {
            id: format!("policyset-{}", sets.len() + 1),
            name: request.name,
            region: request.region,
            media_type: request.media_type,
        };
        sets.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_policy_set(
        &self,
        target: PolicySetRequest,
        request: UpdatePolicySet,
    ) -> Result<PolicySet, ApiError> {
        self.record(Call::UpdatePolicySet(target.clone(), request.clone()));
        let mut sets = self.policy_sets.lock().unwrap();
        let set = sets
            .get_mut(&target.policy_set_id)
            .ok_or_else(|| ApiError::not_found("Policy set not found"))?;
        set.name = request.name;
        set.region = request.region;
        Ok(set.clone())
    }

    async fn delete_policy_set(&self, request: PolicySetRequest) -> Result<(), ApiError> {
        self.record(Call::DeletePolicySet(request.clone()));
        self.policy_sets
            .lock()
            .unwrap()
            .remove(&request.policy_set_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("Policy set not found"))
    }

    async fn get_policy(&self, request: PolicyRequest) -> Result<JsonObject, ApiError> {
        self.record(Call::GetPolicy(request.clone()));
        self.policies
            .lock()
            .unwrap()
            .get(&policy_key(&request))
            .cloned()
            .ok_or_else(|| ApiError::not_found("Policy not found"))
    }

    async fn upsert_policy(&self, request: UpsertPolicyRequest) -> Result<(), ApiError> {
        self.record(Call::UpsertPolicy(request.clone()));
        let mut document: JsonObject = serde_json::from_slice(&request.json_payload)
            .map_err(|e| ApiError::status(400, e.to_string()))?;

        let mut policies = self.policies.lock().unwrap();
        let key = policy_key(&request.target);
        let version = policies
            .get(&key)
            .and_then(|p| p.get("version"))
            .and_then(JsonValue::as_i64)
            .unwrap_or(0)
            + 1;
        document.insert("id".to_string(), JsonValue::from(request.target.policy_id.clone()));
        document.insert("version".to_string(), JsonValue::from(version));
        document.insert("user".to_string(), JsonValue::from("jsmith"));
        document.insert(
            "dateCreated".to_string(),
            JsonValue::from("2022-01-11 10:12:52+0000"),
        );
        if version > 1 {
            document.insert("previousVersion".to_string(), JsonValue::from(version - 1));
        }
        policies.insert(key, document);
        Ok(())
    }

    async fn delete_policy(&self, request: PolicyRequest) -> Result<(), ApiError> {
        self.record(Call::DeletePolicy(request.clone()));
        self.policies
            .lock()
            .unwrap()
            .remove(&policy_key(&request))
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found("Policy not found"))
    }
}
