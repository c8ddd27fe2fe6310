//! Identity and access management API client

use async_trait::async_trait;
use edgeform_core::client::{ApiError, ApiRequest, Session};
use serde::{Deserialize, Serialize};

/// Session timeout a user can be assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    pub name: String,
    /// Timeout in seconds
    pub value: i64,
}

#[async_trait]
pub trait Iam: Send + Sync {
    async fn list_timeout_policies(&self) -> Result<Vec<TimeoutPolicy>, ApiError>;
}

/// IAM client over an authenticated session
pub struct HttpIam {
    session: Session,
}

impl HttpIam {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Iam for HttpIam {
    async fn list_timeout_policies(&self) -> Result<Vec<TimeoutPolicy>, ApiError> {
        self.session
            .exec_json(ApiRequest::get(
                "/identity-management/v3/user-admin/common/timeout-policies",
            ))
            .await
    }
}
