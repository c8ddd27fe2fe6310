//! Configuration version resolution
//!
//! Security configurations are versioned. Read paths look at the latest
//! version; write paths need a version that is not active on any network.

use async_trait::async_trait;

use crate::client::OperationMeta;
use crate::provider::ProviderResult;

#[async_trait]
pub trait ConfigVersionResolver: Send + Sync {
    /// Most recent version of the configuration
    async fn latest_version(&self, meta: &OperationMeta, config_id: i64) -> ProviderResult<i64>;

    /// A version that is safe to modify
    ///
    /// When the latest version is active on staging or production a new
    /// version is cloned from it. `resource_tag` names the calling resource
    /// for logging.
    async fn modifiable_version(
        &self,
        meta: &OperationMeta,
        config_id: i64,
        resource_tag: &str,
    ) -> ProviderResult<i64>;
}
