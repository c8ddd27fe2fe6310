//! Test doubles for the client plumbing

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::client::{ApiError, ApiRequest, ApiResponse, OperationMeta, Session, Transport};
use crate::config::EdgegridConfig;
use crate::provider::ProviderResult;
use crate::version::ConfigVersionResolver;

/// Transport that records every request and replays queued responses
///
/// With an empty queue each request is answered with `200 {}`.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    responses: Arc<Mutex<VecDeque<Result<ApiResponse, ApiError>>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the response for the next request
    pub fn respond(&self, response: ApiResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a JSON body with status 200
    pub fn respond_json(&self, body: serde_json::Value) {
        self.respond(ApiResponse::ok(body.to_string()));
    }

    pub fn fail(&self, error: ApiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Session over this transport with placeholder credentials
    pub fn session(&self) -> Session {
        Session::new(test_config(), Arc::new(self.clone()))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        _config: &EdgegridConfig,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::ok("{}")))
    }
}

/// Placeholder credentials
pub fn test_config() -> EdgegridConfig {
    EdgegridConfig {
        host: "akab-test.luna.example.net".to_string(),
        client_token: "akab-client-token".to_string(),
        client_secret: "client-secret".to_string(),
        access_token: "akab-access-token".to_string(),
        account_key: None,
        max_body: EdgegridConfig::DEFAULT_MAX_BODY,
    }
}

/// Resolver answering a fixed version for every configuration
#[derive(Debug, Clone, Copy)]
pub struct FixedVersion(pub i64);

#[async_trait]
impl ConfigVersionResolver for FixedVersion {
    async fn latest_version(&self, _meta: &OperationMeta, _config_id: i64) -> ProviderResult<i64> {
        Ok(self.0)
    }

    async fn modifiable_version(
        &self,
        _meta: &OperationMeta,
        _config_id: i64,
        _resource_tag: &str,
    ) -> ProviderResult<i64> {
        Ok(self.0)
    }
}
