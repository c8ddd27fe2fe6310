//! akamai_botman_client_side_security
//!
//! The settings document passes through unchanged. The API has no delete,
//! so removal only stops tracking the configuration.

use std::sync::Arc;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::id;
use edgeform_core::json_payload;
use edgeform_core::provider::{ProviderResult, Resource, verify_unchanged};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{
    AttributeSchema, AttributeType, ResourceSchema, suppress_equivalent_json, types,
};
use edgeform_core::version::ConfigVersionResolver;

use super::client::{Botman, GetClientSideSecurityRequest, UpdateClientSideSecurityRequest};
use crate::upstream;

pub(crate) const RESOURCE_TYPE: &str = "akamai_botman_client_side_security";
const VERSION_TAG: &str = "clientSideSecurity";
const PAYLOAD_FIELD: &str = "client_side_security";

pub(crate) struct ClientSideSecurityResource {
    pub(crate) client: ClientAccessor<dyn Botman>,
    pub(crate) versions: Arc<dyn ConfigVersionResolver>,
}

fn config_id_from(d: &ResourceData) -> ProviderResult<i64> {
    let id = d.require_id()?;
    let parts = id::decompose(id, 1, "configID")?;
    id::parse_numeric(&parts[0], id, "configID")
}

impl ClientSideSecurityResource {
    async fn write(
        &self,
        meta: &OperationMeta,
        config_id: i64,
        d: &ResourceData,
    ) -> ProviderResult<()> {
        let client = self.client.client(meta)?;
        let version = self
            .versions
            .modifiable_version(meta, config_id, VERSION_TAG)
            .await?;
        let json_payload = json_payload::extract(d, PAYLOAD_FIELD, None)?;

        client
            .update_client_side_security(UpdateClientSideSecurityRequest {
                config_id,
                version,
                json_payload,
            })
            .await
            .map_err(upstream("UpdateClientSideSecurity"))?;
        Ok(())
    }
}

#[async_trait]
impl Resource for ClientSideSecurityResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .attribute(AttributeSchema::new("config_id", AttributeType::Int).required())
            .attribute(
                AttributeSchema::new(PAYLOAD_FIELD, types::json_string())
                    .required()
                    .with_diff_suppress(suppress_equivalent_json)
                    .with_description("The client side security settings"),
            )
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", RESOURCE_TYPE);
        let config_id = d.get_int("config_id")?;
        self.write(meta, config_id, d).await?;
        d.set_id(config_id.to_string());
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let config_id = config_id_from(d)?;
        let version = self.versions.latest_version(meta, config_id).await?;

        let response = client
            .get_client_side_security(GetClientSideSecurityRequest { config_id, version })
            .await
            .map_err(upstream("GetClientSideSecurity"))?;

        d.set_attrs([
            ("config_id", Value::Int(config_id)),
            (PAYLOAD_FIELD, Value::from(json_payload::encode(&response)?)),
        ])
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", RESOURCE_TYPE);
        let config_id = config_id_from(d)?;
        self.write(meta, config_id, d).await?;
        self.read(meta, d).await
    }

    async fn delete(&self, _meta: &OperationMeta, _d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", RESOURCE_TYPE);
        log::info!(
            "Botman API does not support client side security deletion - resource will only be removed from state"
        );
        Ok(())
    }

    fn customize_diff(&self, old: &ResourceData, new: &ResourceData) -> ProviderResult<()> {
        verify_unchanged(old, new, "config_id")
    }
}
