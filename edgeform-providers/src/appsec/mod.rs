//! Application security subprovider
//!
//! Security configurations are versioned; resources here resolve the
//! version to read or write through [`AppsecConfigVersions`], which is also
//! handed to the botman subprovider.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta, Session};
use edgeform_core::provider::{DataSource, ProviderResult, Resource, Subprovider};
use edgeform_core::version::ConfigVersionResolver;

use crate::upstream;

pub mod client;
mod data_sources;
mod siem_settings;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{Appsec, HttpAppsec};

use client::{CreateConfigurationVersionCloneRequest, GetConfigurationRequest};

/// Update anytime the subprovider adds new features
pub const PROVIDER_VERSION: &str = "v1.13.0";

fn session_client(session: &Session) -> Arc<dyn Appsec> {
    Arc::new(HttpAppsec::new(session.clone()))
}

pub struct AppsecProvider {
    client: ClientAccessor<dyn Appsec>,
    versions: Arc<AppsecConfigVersions>,
}

impl AppsecProvider {
    pub fn new() -> Self {
        Self::from_accessor(ClientAccessor::new(session_client))
    }

    /// Subprovider whose resources always use `client`
    pub fn with_client(client: Arc<dyn Appsec>) -> Self {
        Self::from_accessor(ClientAccessor::new(session_client).with_client(client))
    }

    fn from_accessor(client: ClientAccessor<dyn Appsec>) -> Self {
        Self {
            versions: Arc::new(AppsecConfigVersions {
                client: client.clone(),
            }),
            client,
        }
    }

    /// Version resolver backed by this subprovider's client
    pub fn versions(&self) -> Arc<dyn ConfigVersionResolver> {
        self.versions.clone()
    }
}

impl Default for AppsecProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Subprovider for AppsecProvider {
    fn name(&self) -> &'static str {
        "appsec"
    }

    fn version(&self) -> &'static str {
        PROVIDER_VERSION
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>> {
        let mut resources: BTreeMap<String, Arc<dyn Resource>> = BTreeMap::new();
        resources.insert(
            siem_settings::RESOURCE_TYPE.to_string(),
            Arc::new(siem_settings::SiemSettingsResource {
                client: self.client.clone(),
                versions: self.versions(),
            }),
        );
        resources
    }

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>> {
        data_sources::all(&self.client, &self.versions())
    }
}

/// Resolves configuration versions from the configuration's activation state
pub struct AppsecConfigVersions {
    client: ClientAccessor<dyn Appsec>,
}

#[async_trait]
impl ConfigVersionResolver for AppsecConfigVersions {
    async fn latest_version(&self, meta: &OperationMeta, config_id: i64) -> ProviderResult<i64> {
        let client = self.client.client(meta)?;
        let configuration = client
            .get_configuration(GetConfigurationRequest { config_id })
            .await
            .map_err(upstream("GetConfiguration"))?;
        Ok(configuration.latest_version)
    }

    async fn modifiable_version(
        &self,
        meta: &OperationMeta,
        config_id: i64,
        resource_tag: &str,
    ) -> ProviderResult<i64> {
        let client = self.client.client(meta)?;
        let configuration = client
            .get_configuration(GetConfigurationRequest { config_id })
            .await
            .map_err(upstream("GetConfiguration"))?;

        let latest = configuration.latest_version;
        let active = configuration.staging_version == Some(latest)
            || configuration.production_version == Some(latest);
        if !active {
            return Ok(latest);
        }

        let cloned = client
            .create_configuration_version_clone(CreateConfigurationVersionCloneRequest {
                config_id,
                create_from_version: latest,
            })
            .await
            .map_err(upstream("CreateConfigurationVersionClone"))?;
        log::info!(
            "{}: version {} of configuration {} is active, cloned version {}",
            resource_tag,
            latest,
            config_id,
            cloned.version
        );
        Ok(cloned.version)
    }
}
