//! Identity and access management subprovider

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta, Session};
use edgeform_core::provider::{DataSource, ProviderResult, Resource, Subprovider};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use crate::upstream;

pub mod client;

pub use client::{HttpIam, Iam};

/// Update anytime the subprovider adds new features
pub const PROVIDER_VERSION: &str = "v0.0.1";

const TIMEOUT_POLICIES: &str = "akamai_iam_timeout_policies";

fn session_client(session: &Session) -> Arc<dyn Iam> {
    Arc::new(HttpIam::new(session.clone()))
}

pub struct IamProvider {
    client: ClientAccessor<dyn Iam>,
}

impl IamProvider {
    pub fn new() -> Self {
        Self {
            client: ClientAccessor::new(session_client),
        }
    }

    /// Subprovider whose data sources always use `client`
    pub fn with_client(client: Arc<dyn Iam>) -> Self {
        Self {
            client: ClientAccessor::new(session_client).with_client(client),
        }
    }
}

impl Default for IamProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Subprovider for IamProvider {
    fn name(&self) -> &'static str {
        "iam"
    }

    fn version(&self) -> &'static str {
        PROVIDER_VERSION
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>> {
        BTreeMap::new()
    }

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>> {
        let mut data_sources: BTreeMap<String, Arc<dyn DataSource>> = BTreeMap::new();
        data_sources.insert(
            TIMEOUT_POLICIES.to_string(),
            Arc::new(TimeoutPolicies {
                client: self.client.clone(),
            }),
        );
        data_sources
    }
}

/// Session timeout policies by name
struct TimeoutPolicies {
    client: ClientAccessor<dyn Iam>,
}

#[async_trait]
impl DataSource for TimeoutPolicies {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(TIMEOUT_POLICIES)
            .with_description("Session timeout policies available to users")
            .attribute(
                AttributeSchema::new(
                    "policies",
                    AttributeType::Map(Box::new(AttributeType::Int)),
                )
                .computed()
                .with_description("Map of policy names to timeouts in seconds"),
            )
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", TIMEOUT_POLICIES);
        let client = self.client.client(meta)?;
        let policies = client
            .list_timeout_policies()
            .await
            .map_err(upstream("ListTimeoutPolicies"))?;

        let policies: BTreeMap<String, Value> = policies
            .into_iter()
            .map(|policy| (policy.name, Value::Int(policy.value)))
            .collect();
        d.set("policies", Value::Map(policies))?;
        d.set_id(TIMEOUT_POLICIES);
        Ok(())
    }
}
