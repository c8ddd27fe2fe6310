//! Image and video manager subprovider

use std::collections::BTreeMap;
use std::sync::Arc;

use edgeform_core::client::{ClientAccessor, Session};
use edgeform_core::provider::{DataSource, Resource, Subprovider};

pub mod client;
mod data_sources;
mod policy;
mod policy_set;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{HttpImaging, Imaging};

/// Update anytime the subprovider adds new features
pub const PROVIDER_VERSION: &str = "v1.0.0";

/// Media handled by a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Resource and data source type of this kind's policies
    pub(crate) fn policy_type(self) -> &'static str {
        match self {
            MediaKind::Image => "akamai_imaging_policy_image",
            MediaKind::Video => "akamai_imaging_policy_video",
        }
    }

    fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "Image",
            MediaKind::Video => "Video",
        }
    }
}

fn session_client(session: &Session) -> Arc<dyn Imaging> {
    Arc::new(HttpImaging::new(session.clone()))
}

pub struct ImagingProvider {
    client: ClientAccessor<dyn Imaging>,
}

impl ImagingProvider {
    pub fn new() -> Self {
        Self {
            client: ClientAccessor::new(session_client),
        }
    }

    /// Subprovider whose resources always use `client`
    pub fn with_client(client: Arc<dyn Imaging>) -> Self {
        Self {
            client: ClientAccessor::new(session_client).with_client(client),
        }
    }
}

impl Default for ImagingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Subprovider for ImagingProvider {
    fn name(&self) -> &'static str {
        "imaging"
    }

    fn version(&self) -> &'static str {
        PROVIDER_VERSION
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>> {
        let mut resources: BTreeMap<String, Arc<dyn Resource>> = BTreeMap::new();
        resources.insert(
            policy_set::RESOURCE_TYPE.to_string(),
            Arc::new(policy_set::PolicySetResource {
                client: self.client.clone(),
            }),
        );
        for kind in [MediaKind::Image, MediaKind::Video] {
            resources.insert(
                kind.policy_type().to_string(),
                Arc::new(policy::PolicyResource {
                    kind,
                    client: self.client.clone(),
                }),
            );
        }
        resources
    }

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>> {
        [MediaKind::Image, MediaKind::Video]
            .into_iter()
            .map(|kind| {
                let data_source: Arc<dyn DataSource> =
                    Arc::new(data_sources::PolicyDocument { kind });
                (kind.policy_type().to_string(), data_source)
            })
            .collect()
    }
}
