use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use edgeform_core::client::ApiError;

use super::client::*;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    GetAkamaiCategoryAction(GetCategoryActionRequest),
    UpdateAkamaiCategoryAction(UpdateCategoryActionRequest),
    GetCustomCategoryAction(GetCategoryActionRequest),
    UpdateCustomCategoryAction(UpdateCategoryActionRequest),
    GetClientSideSecurity(GetClientSideSecurityRequest),
    UpdateClientSideSecurity(UpdateClientSideSecurityRequest),
}

/// In-memory botman API echoing the last stored document
#[derive(Default)]
pub(crate) struct MockBotman {
    calls: Mutex<Vec<Call>>,
    /// Category actions keyed by (custom, policy, category)
    category_actions: Mutex<HashMap<(bool, String, String), JsonObject>>,
    client_side_security: Mutex<JsonObject>,
    /// Response replacing the echoed document of the next update
    pub next_response: Mutex<Option<JsonObject>>,
}

impl MockBotman {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn store(&self, payload: &[u8]) -> Result<JsonObject, ApiError> {
        let echoed: JsonObject =
            serde_json::from_slice(payload).map_err(|e| ApiError::status(400, e.to_string()))?;
        Ok(self.next_response.lock().unwrap().take().unwrap_or(echoed))
    }

    fn get_action(
        &self,
        custom: bool,
        request: &GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.category_actions
            .lock()
            .unwrap()
            .get(&(
                custom,
                request.security_policy_id.clone(),
                request.category_id.clone(),
            ))
            .cloned()
            .ok_or_else(|| ApiError::not_found("Bot category action not found"))
    }

    fn update_action(
        &self,
        custom: bool,
        request: &UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        let stored = self.store(&request.json_payload)?;
        self.category_actions.lock().unwrap().insert(
            (
                custom,
                request.security_policy_id.clone(),
                request.category_id.clone(),
            ),
            stored.clone(),
        );
        Ok(stored)
    }
}

#[async_trait]
impl Botman for MockBotman {
    async fn get_akamai_bot_category_action(
        &self,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::GetAkamaiCategoryAction(request.clone()));
        self.get_action(false, &request)
    }

    async fn update_akamai_bot_category_action(
        &self,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::UpdateAkamaiCategoryAction(request.clone()));
        self.update_action(false, &request)
    }

    async fn get_custom_bot_category_action(
        &self,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::GetCustomCategoryAction(request.clone()));
        self.get_action(true, &request)
    }

    async fn update_custom_bot_category_action(
        &self,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::UpdateCustomCategoryAction(request.clone()));
        self.update_action(true, &request)
    }

    async fn get_client_side_security(
        &self,
        request: GetClientSideSecurityRequest,
    ) -> Result<JsonObject, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::GetClientSideSecurity(request));
        Ok(self.client_side_security.lock().unwrap().clone())
    }

    async fn update_client_side_security(
        &self,
        request: UpdateClientSideSecurityRequest,
    ) -> Result<JsonObject, ApiError> {
        let stored = self.store(&request.json_payload)?;
        self.calls
            .lock()
            .unwrap()
            .push(Call::UpdateClientSideSecurity(request));
        *self.client_side_security.lock().unwrap() = stored.clone();
        Ok(stored)
    }
}
