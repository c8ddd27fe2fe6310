//! Provider - Traits abstracting resource operations
//!
//! A subprovider groups the resources and data sources of one service
//! domain. Each resource implements the CRUD callbacks the host drives;
//! the callbacks translate state into client calls and back.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::{ApiError, OperationMeta};
use crate::config::ConfigError;
use crate::diag::Diagnostics;
use crate::resource::ResourceData;
use crate::schema::{AttributeSchema, ResourceSchema};

/// Error type for provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A required field is absent from the state
    #[error("field '{field}' not found")]
    FieldMissing { field: String },

    /// A field holds a value of the wrong shape
    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// A resource ID does not decompose into the expected parts
    #[error("ID '{id}' incorrectly formatted: should be '{expected}'")]
    InvalidIdentifier { id: String, expected: String },

    /// A JSON payload field does not parse
    #[error("invalid JSON in '{field}': {source}")]
    InvalidJson {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// An API call returned an error
    #[error("calling '{operation}': {source}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    /// Writing decoded fields into the state failed
    #[error("setting '{field}' value: {message}")]
    StateWrite { field: String, message: String },

    /// A field that forms part of the resource ID was changed in configuration
    #[error("{field} value {planned} specified in configuration differs from resource ID's value {current}")]
    Unchangeable {
        field: String,
        planned: String,
        current: String,
    },

    /// Provider configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProviderError {
    /// Wrap a client error with the name of the API operation that produced it
    pub fn upstream(operation: &'static str, source: ApiError) -> Self {
        Self::Upstream { operation, source }
    }

    /// Whether this error reports a remote object that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Upstream { source, .. } if source.is_not_found())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A manageable entity with a create/read/update/delete lifecycle
#[async_trait]
pub trait Resource: Send + Sync {
    fn schema(&self) -> ResourceSchema;

    /// Create the remote object, set the ID, then refresh via read
    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()>;

    /// Refresh every declared field from the remote object named by the ID
    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()>;

    /// Apply configuration to the existing remote object; the ID is kept
    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()>;

    /// Remove the remote object, or only stop tracking it when the API has no delete
    async fn delete(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()>;

    /// Import by ID; the default passes the ID through and reads
    async fn import(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        self.read(meta, d).await
    }

    /// Reject a planned change before it is applied (`old` has the ID)
    fn customize_diff(&self, _old: &ResourceData, _new: &ResourceData) -> ProviderResult<()> {
        Ok(())
    }
}

/// A read-only projection with no lifecycle beyond read
#[async_trait]
pub trait DataSource: Send + Sync {
    fn schema(&self) -> ResourceSchema;

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()>;
}

/// One service domain's contribution to the root provider
pub trait Subprovider: Send + Sync {
    /// Name of this subprovider (e.g., "dns")
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Provider configuration attributes contributed by this subprovider
    fn schema(&self) -> Vec<AttributeSchema> {
        Vec::new()
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>>;

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>>;

    /// Inspect and normalise the provider configuration block
    fn configure(&self, _config: &mut ResourceData) -> Diagnostics {
        Diagnostics::new()
    }
}

/// Reject a change of `field` between the ID-carrying state and the plan
pub fn verify_unchanged(
    old: &ResourceData,
    new: &ResourceData,
    field: &str,
) -> ProviderResult<()> {
    if old.id().is_none() {
        return Ok(());
    }
    match (old.get(field), new.get(field)) {
        (Some(current), Some(planned)) if current != planned => Err(ProviderError::Unchangeable {
            field: field.to_string(),
            planned: display_value(planned),
            current: display_value(current),
        }),
        _ => Ok(()),
    }
}

fn display_value(value: &crate::resource::Value) -> String {
    match value {
        crate::resource::Value::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}
