//! API client plumbing shared by every subprovider
//!
//! Each service domain defines its own client trait. Real clients translate
//! typed requests into [`ApiRequest`]s executed by a [`Session`]; the HTTP
//! transport and request signing sit behind the [`Transport`] trait. A
//! [`ClientAccessor`] hands out an injected test double when one is set and
//! a session-bound client otherwise.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ConfigError, EdgegridConfig};
use crate::provider::ProviderResult;

/// Errors returned by API clients
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-success status
    #[error("API error {status}: {title}{}", detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default())]
    Status {
        status: u16,
        title: String,
        detail: Option<String>,
    },

    /// The request could not be delivered
    #[error("transport error: {0}")]
    Transport(String),

    /// The request body could not be encoded
    #[error("encoding request: {0}")]
    Encode(String),

    /// The response body did not match the expected shape
    #[error("decoding response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(status: u16, title: impl Into<String>) -> Self {
        Self::Status {
            status,
            title: title.into(),
            detail: None,
        }
    }

    pub fn not_found(title: impl Into<String>) -> Self {
        Self::status(404, title)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{}", s)
    }
}

/// A request relative to the configured API host
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Body already encoded as JSON (payload passthrough)
    pub fn raw_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn json_body<T: Serialize>(self, body: &T) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(self.raw_body(bytes))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Delivers signed requests to the API host
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        config: &EdgegridConfig,
        request: ApiRequest,
    ) -> Result<ApiResponse, ApiError>;
}

/// Authenticated connection to the API: credentials plus a transport
#[derive(Clone)]
pub struct Session {
    config: Arc<EdgegridConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Problem details body returned by the API on failure
#[derive(serde::Deserialize)]
struct Problem {
    title: Option<String>,
    detail: Option<String>,
}

impl Session {
    pub fn new(config: EdgegridConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &EdgegridConfig {
        &self.config
    }

    /// Send a request, turning non-success statuses into [`ApiError::Status`]
    pub async fn exec(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        log::trace!("{} {}", request.method, request.path);
        let response = self.transport.send(&self.config, request).await?;
        if (200..300).contains(&response.status) {
            return Ok(response);
        }
        let problem = serde_json::from_slice::<Problem>(&response.body).ok();
        Err(ApiError::Status {
            status: response.status,
            title: problem
                .as_ref()
                .and_then(|p| p.title.clone())
                .unwrap_or_else(|| format!("request failed with status {}", response.status)),
            detail: problem.and_then(|p| p.detail),
        })
    }

    /// Send a request and decode the JSON response body
    pub async fn exec_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.exec(request).await?;
        serde_json::from_slice(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send a request whose response body is ignored
    pub async fn exec_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.exec(request).await.map(|_| ())
    }
}

/// Per-operation context handed to every callback
#[derive(Debug, Clone, Default)]
pub struct OperationMeta {
    session: Option<Session>,
}

impl OperationMeta {
    pub fn new(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Context without credentials; only injected clients can be used
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn session(&self) -> ProviderResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| ConfigError::NotConfigured.into())
    }
}

/// Resolves the client of one service domain
pub struct ClientAccessor<C: ?Sized> {
    injected: Option<Arc<C>>,
    from_session: fn(&Session) -> Arc<C>,
}

impl<C: ?Sized> ClientAccessor<C> {
    pub fn new(from_session: fn(&Session) -> Arc<C>) -> Self {
        Self {
            injected: None,
            from_session,
        }
    }

    /// Always hand out `client`, e.g. a test double
    pub fn with_client(mut self, client: Arc<C>) -> Self {
        self.injected = Some(client);
        self
    }

    pub fn client(&self, meta: &OperationMeta) -> ProviderResult<Arc<C>> {
        if let Some(client) = &self.injected {
            return Ok(Arc::clone(client));
        }
        Ok((self.from_session)(meta.session()?))
    }
}

impl<C: ?Sized> Clone for ClientAccessor<C> {
    fn clone(&self) -> Self {
        Self {
            injected: self.injected.clone(),
            from_session: self.from_session,
        }
    }
}
