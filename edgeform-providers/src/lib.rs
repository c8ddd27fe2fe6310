//! Edgeform Providers
//!
//! Subproviders for each service domain of the edge platform.
//!
//! ## Module Structure
//!
//! - `appsec` - Application security configurations and their versions
//! - `botman` - Bot management actions and client-side security
//! - `dns` - Edge DNS zones and records
//! - `imaging` - Image and video policies
//! - `iam` - Identity and access management lookups
//! - `cps` - Certificate provisioning warnings

use std::sync::Arc;

use edgeform_core::client::ApiError;
use edgeform_core::provider::{ProviderError, Subprovider};

pub mod appsec;
pub mod botman;
pub mod cps;
pub mod dns;
pub mod iam;
pub mod imaging;

mod output;

/// Every subprovider with a real client, sharing one configuration version resolver
pub fn subproviders() -> Vec<Arc<dyn Subprovider>> {
    let appsec = appsec::AppsecProvider::new();
    let versions = appsec.versions();
    vec![
        Arc::new(appsec),
        Arc::new(botman::BotmanProvider::new(versions)),
        Arc::new(dns::DnsProvider::new()),
        Arc::new(imaging::ImagingProvider::new()),
        Arc::new(iam::IamProvider::new()),
        Arc::new(cps::CpsProvider),
    ]
}

/// Log a failed API call and wrap it with the operation name
pub(crate) fn upstream(operation: &'static str) -> impl FnOnce(ApiError) -> ProviderError {
    move |err| {
        log::error!("calling '{}': {}", operation, err);
        ProviderError::upstream(operation, err)
    }
}
