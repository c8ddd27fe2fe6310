//! Edgeform Core
//!
//! Framework for exposing edge platform configuration APIs as declarative
//! resources and data sources

pub mod client;
pub mod config;
pub mod diag;
pub mod id;
pub mod json_payload;
pub mod provider;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod version;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export main types
pub use client::{
    ApiError, ApiRequest, ApiResponse, ClientAccessor, OperationMeta, Session, Transport,
};
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use provider::{DataSource, ProviderError, ProviderResult, Resource, Subprovider};
pub use registry::ProviderRegistry;
pub use resource::{ResourceData, Value};
