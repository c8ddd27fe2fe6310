//! Bot management API client
//!
//! Bot management settings are free-form JSON documents; requests carry
//! the payload as already-encoded bytes and responses come back as objects.

use async_trait::async_trait;
use edgeform_core::client::{ApiError, ApiRequest, Session};

pub type JsonObject = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCategoryActionRequest {
    pub config_id: i64,
    pub version: i64,
    pub security_policy_id: String,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCategoryActionRequest {
    pub config_id: i64,
    pub version: i64,
    pub security_policy_id: String,
    pub category_id: String,
    pub json_payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetClientSideSecurityRequest {
    pub config_id: i64,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateClientSideSecurityRequest {
    pub config_id: i64,
    pub version: i64,
    pub json_payload: Vec<u8>,
}

#[async_trait]
pub trait Botman: Send + Sync {
    async fn get_akamai_bot_category_action(
        &self,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError>;

    async fn update_akamai_bot_category_action(
        &self,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError>;

    async fn get_custom_bot_category_action(
        &self,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError>;

    async fn update_custom_bot_category_action(
        &self,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError>;

    async fn get_client_side_security(
        &self,
        request: GetClientSideSecurityRequest,
    ) -> Result<JsonObject, ApiError>;

    async fn update_client_side_security(
        &self,
        request: UpdateClientSideSecurityRequest,
    ) -> Result<JsonObject, ApiError>;
}

/// Botman client over an authenticated session
pub struct HttpBotman {
    session: Session,
}

impl HttpBotman {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    fn category_action_path(
        collection: &str,
        config_id: i64,
        version: i64,
        security_policy_id: &str,
        category_id: &str,
    ) -> String {
        format!(
            "/appsec/v1/configs/{}/versions/{}/security-policies/{}/{}/{}",
            config_id, version, security_policy_id, collection, category_id
        )
    }

    async fn get_category_action(
        &self,
        collection: &str,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.session
            .exec_json(ApiRequest::get(Self::category_action_path(
                collection,
                request.config_id,
                request.version,
                &request.security_policy_id,
                &request.category_id,
            )))
            .await
    }

    async fn update_category_action(
        &self,
        collection: &str,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        let path = Self::category_action_path(
            collection,
            request.config_id,
            request.version,
            &request.security_policy_id,
            &request.category_id,
        );
        self.session
            .exec_json(
                ApiRequest::put(path)
                    .header("Content-Type", "application/json")
                    .raw_body(request.json_payload),
            )
            .await
    }
}

const AKAMAI_CATEGORY_ACTIONS: &str = "akamai-bot-category-actions";
const CUSTOM_CATEGORY_ACTIONS: &str = "custom-bot-category-actions";

fn client_side_security_path(config_id: i64, version: i64) -> String {
    format!(
        "/appsec/v1/configs/{}/versions/{}/advanced-settings/client-side-security",
        config_id, version
    )
}

#[async_trait]
impl Botman for HttpBotman {
    async fn get_akamai_bot_category_action(
        &self,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.get_category_action(AKAMAI_CATEGORY_ACTIONS, request)
            .await
    }

    async fn update_akamai_bot_category_action(
        &self,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.update_category_action(AKAMAI_CATEGORY_ACTIONS, request)
            .await
    }

    async fn get_custom_bot_category_action(
        &self,
        request: GetCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.get_category_action(CUSTOM_CATEGORY_ACTIONS, request)
            .await
    }

    async fn update_custom_bot_category_action(
        &self,
        request: UpdateCategoryActionRequest,
    ) -> Result<JsonObject, ApiError> {
        self.update_category_action(CUSTOM_CATEGORY_ACTIONS, request)
            .await
    }

    async fn get_client_side_security(
        &self,
        request: GetClientSideSecurityRequest,
    ) -> Result<JsonObject, ApiError> {
        self.session
            .exec_json(ApiRequest::get(client_side_security_path(
                request.config_id,
                request.version,
            )))
            .await
    }

    async fn update_client_side_security(
        &self,
        request: UpdateClientSideSecurityRequest,
    ) -> Result<JsonObject, ApiError> {
        self.session
            .exec_json(
                ApiRequest::put(client_side_security_path(request.config_id, request.version))
                    .header("Content-Type", "application/json")
                    .raw_body(request.json_payload),
            )
            .await
    }
}
