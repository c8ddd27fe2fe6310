//! akamai_imaging_policy_set

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::id;
use edgeform_core::provider::{ProviderResult, Resource, verify_unchanged};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::client::{CreatePolicySet, Imaging, PolicySetRequest, UpdatePolicySet};
use crate::upstream;

pub(crate) const RESOURCE_TYPE: &str = "akamai_imaging_policy_set";

const IMPORT_HINT: &str = "policySetID:contractID";

const REGIONS: &[&str] = &["US", "EMEA", "ASIA", "AUSTRALIA", "JAPAN", "CHINA"];

pub(crate) struct PolicySetResource {
    pub(crate) client: ClientAccessor<dyn Imaging>,
}

fn target(d: &ResourceData) -> ProviderResult<PolicySetRequest> {
    Ok(PolicySetRequest {
        policy_set_id: d.require_id()?.to_string(),
        contract_id: d.get_string("contract_id")?,
    })
}

#[async_trait]
impl Resource for PolicySetResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("Image and video policy set")
            .attribute(AttributeSchema::new("contract_id", AttributeType::String).required())
            .attribute(
                AttributeSchema::new("name", AttributeType::String)
                    .required()
                    .with_description("A friendly name for the policy set"),
            )
            .attribute(AttributeSchema::new("region", types::one_of(REGIONS)).required())
            .attribute(
                AttributeSchema::new("type", types::one_of(&["IMAGE", "VIDEO"]))
                    .required()
                    .with_description("The type of media this policy set manages"),
            )
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let contract_id = d.get_string("contract_id")?;

        let created = client
            .create_policy_set(
                &contract_id,
                CreatePolicySet {
                    name: d.get_string("name")?,
                    region: d.get_string("region")?,
                    media_type: d.get_string("type")?,
                },
            )
            .await
            .map_err(upstream("CreatePolicySet"))?;
        d.set_id(created.id);
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let request = target(d)?;

        let policy_set = match client.get_policy_set(request).await {
            Ok(policy_set) => policy_set,
            Err(err) if err.is_not_found() => {
                d.clear_id();
                return Ok(());
            }
            Err(err) => return Err(upstream("GetPolicySet")(err)),
        };
        d.set_attrs([
            ("name", Value::from(policy_set.name)),
            ("region", Value::from(policy_set.region)),
            ("type", Value::from(policy_set.media_type)),
        ])
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        client
            .update_policy_set(
                target(d)?,
                UpdatePolicySet {
                    name: d.get_string("name")?,
                    region: d.get_string("region")?,
                },
            )
            .await
            .map_err(upstream("UpdatePolicySet"))?;
        self.read(meta, d).await
    }

    async fn delete(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        client
            .delete_policy_set(target(d)?)
            .await
            .map_err(upstream("DeletePolicySet"))?;
        Ok(())
    }

    async fn import(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} import", RESOURCE_TYPE);
        let import_id = d.require_id()?.to_string();
        let parts = id::decompose(&import_id, 2, IMPORT_HINT)?;
        d.set("contract_id", parts[1].clone())?;
        d.set_id(parts[0].clone());
        self.read(meta, d).await
    }

    fn customize_diff(&self, old: &ResourceData, new: &ResourceData) -> ProviderResult<()> {
        for field in ["contract_id", "type"] {
            verify_unchanged(old, new, field)?;
        }
        Ok(())
    }
}
