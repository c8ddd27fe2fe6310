//! Bot management subprovider
//!
//! Bot management settings live inside security configurations, so every
//! resource here resolves configuration versions through the injected
//! resolver. None of the endpoints support deletion.

use std::collections::BTreeMap;
use std::sync::Arc;

use edgeform_core::client::{ClientAccessor, Session};
use edgeform_core::provider::{DataSource, Resource, Subprovider};
use edgeform_core::version::ConfigVersionResolver;

mod category_action;
pub mod client;
mod client_side_security;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{Botman, HttpBotman};

use category_action::{CategoryActionResource, CategoryKind};
use client_side_security::ClientSideSecurityResource;

/// Update anytime the subprovider adds new features
pub const PROVIDER_VERSION: &str = "v1.0.0";

fn session_client(session: &Session) -> Arc<dyn Botman> {
    Arc::new(HttpBotman::new(session.clone()))
}

pub struct BotmanProvider {
    client: ClientAccessor<dyn Botman>,
    versions: Arc<dyn ConfigVersionResolver>,
}

impl BotmanProvider {
    pub fn new(versions: Arc<dyn ConfigVersionResolver>) -> Self {
        Self {
            client: ClientAccessor::new(session_client),
            versions,
        }
    }

    /// Subprovider whose resources always use `client`
    pub fn with_client(client: Arc<dyn Botman>, versions: Arc<dyn ConfigVersionResolver>) -> Self {
        Self {
            client: ClientAccessor::new(session_client).with_client(client),
            versions,
        }
    }
}

impl Subprovider for BotmanProvider {
    fn name(&self) -> &'static str {
        "botman"
    }

    fn version(&self) -> &'static str {
        PROVIDER_VERSION
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>> {
        let mut resources: BTreeMap<String, Arc<dyn Resource>> = BTreeMap::new();
        for kind in [CategoryKind::Akamai, CategoryKind::Custom] {
            resources.insert(
                kind.resource_type().to_string(),
                Arc::new(CategoryActionResource {
                    kind,
                    client: self.client.clone(),
                    versions: Arc::clone(&self.versions),
                }),
            );
        }
        resources.insert(
            client_side_security::RESOURCE_TYPE.to_string(),
            Arc::new(ClientSideSecurityResource {
                client: self.client.clone(),
                versions: Arc::clone(&self.versions),
            }),
        );
        resources
    }

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>> {
        BTreeMap::new()
    }
}
