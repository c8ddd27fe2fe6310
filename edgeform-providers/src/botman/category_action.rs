//! Akamai and custom bot category actions
//!
//! Both resources share one shape: a JSON action document per
//! (security policy, category) pair of a configuration. The category ID is
//! injected into outgoing payloads and stripped from responses, since it is
//! tracked as its own attribute.

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

use super::client::{Botman, GetCategoryActionRequest, UpdateCategoryActionRequest};
use crate::upstream;

const ID_HINT: &str = "configID:securityPolicyID:categoryID";
const CATEGORY_ID_KEY: &str = "categoryId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CategoryKind {
    Akamai,
    Custom,
}

impl CategoryKind {
    pub(crate) fn resource_type(self) -> &'static str {
        match self {
            CategoryKind::Akamai => "akamai_botman_akamai_bot_category_action",
            CategoryKind::Custom => "akamai_botman_custom_bot_category_action",
        }
    }

    fn payload_field(self) -> &'static str {
        match self {
            CategoryKind::Akamai => "akamai_bot_category_action",
            CategoryKind::Custom => "custom_bot_category_action",
        }
    }

    fn version_tag(self) -> &'static str {
        match self {
            CategoryKind::Akamai => "akamaiBotCategoryAction",
            CategoryKind::Custom => "customBotCategoryAction",
        }
    }
}

pub(crate) struct CategoryActionResource {
    pub(crate) kind: CategoryKind,
    pub(crate) client: ClientAccessor<dyn Botman>,
    pub(crate) versions: Arc<dyn ConfigVersionResolver>,
}

struct ActionId {
    config_id: i64,
    security_policy_id: String,
    category_id: String,
}

impl ActionId {
    fn parse(id: &str) -> ProviderResult<Self> {
        let parts = id::decompose(id, 3, ID_HINT)?;
        Ok(Self {
            config_id: id::parse_numeric(&parts[0], id, ID_HINT)?,
            security_policy_id: parts[1].clone(),
            category_id: parts[2].clone(),
        })
    }

    fn compose(&self) -> String {
        id::compose(&[
            self.config_id.to_string(),
            self.security_policy_id.clone(),
            self.category_id.clone(),
        ])
    }
}

impl CategoryActionResource {
    async fn write(
        &self,
        meta: &OperationMeta,
        target: &ActionId,
        d: &ResourceData,
    ) -> ProviderResult<()> {
        let client = self.client.client(meta)?;
        let version = self
            .versions
            .modifiable_version(meta, target.config_id, self.kind.version_tag())
            .await?;
        let json_payload = json_payload::extract(
            d,
            self.kind.payload_field(),
            Some((CATEGORY_ID_KEY, &target.category_id)),
        )?;

        let request = UpdateCategoryActionRequest {
            config_id: target.config_id,
            version,
            security_policy_id: target.security_policy_id.clone(),
            category_id: target.category_id.clone(),
            json_payload,
        };
        match self.kind {
            CategoryKind::Akamai => client
                .update_akamai_bot_category_action(request)
                .await
                .map_err(upstream("UpdateAkamaiBotCategoryAction"))?,
            CategoryKind::Custom => client
                .update_custom_bot_category_action(request)
                .await
                .map_err(upstream("UpdateCustomBotCategoryAction"))?,
        };
        Ok(())
    }
}

#[async_trait]
impl Resource for CategoryActionResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(self.kind.resource_type())
            .attribute(AttributeSchema::new("config_id", AttributeType::Int).required())
            .attribute(
                AttributeSchema::new("security_policy_id", AttributeType::String).required(),
            )
            .attribute(AttributeSchema::new("category_id", AttributeType::String).required())
            .attribute(
                AttributeSchema::new(self.kind.payload_field(), types::json_string())
                    .required()
                    .with_diff_suppress(suppress_equivalent_json),
            )
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", self.kind.resource_type());
        let target = ActionId {
            config_id: d.get_int("config_id")?,
            security_policy_id: d.get_string("security_policy_id")?,
            category_id: d.get_string("category_id")?,
        };
        self.write(meta, &target, d).await?;
        d.set_id(target.compose());
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", self.kind.resource_type());
        let client = self.client.client(meta)?;
        let target = ActionId::parse(d.require_id()?)?;
        let version = self.versions.latest_version(meta, target.config_id).await?;

        let request = GetCategoryActionRequest {
            config_id: target.config_id,
            version,
            security_policy_id: target.security_policy_id.clone(),
            category_id: target.category_id.clone(),
        };
        let response = match self.kind {
            CategoryKind::Akamai => client
                .get_akamai_bot_category_action(request)
                .await
                .map_err(upstream("GetAkamaiBotCategoryAction"))?,
            CategoryKind::Custom => client
                .get_custom_bot_category_action(request)
                .await
                .map_err(upstream("GetCustomBotCategoryAction"))?,
        };

        let document = json_payload::strip_and_encode(response, &[CATEGORY_ID_KEY])?;
        d.set_attrs([
            ("config_id", Value::Int(target.config_id)),
            ("security_policy_id", Value::from(target.security_policy_id)),
            ("category_id", Value::from(target.category_id)),
            (self.kind.payload_field(), Value::from(document)),
        ])
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", self.kind.resource_type());
        let target = ActionId::parse(d.require_id()?)?;
        self.write(meta, &target, d).await?;
        self.read(meta, d).await
    }

    async fn delete(&self, _meta: &OperationMeta, _d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", self.kind.resource_type());
        log::info!(
            "Botman API does not support {} deletion - resource will only be removed from state",
            self.kind.payload_field().replace('_', " ")
        );
        Ok(())
    }

    fn customize_diff(&self, old: &ResourceData, new: &ResourceData) -> ProviderResult<()> {
        for field in ["config_id", "security_policy_id", "category_id"] {
            verify_unchanged(old, new, field)?;
        }
        Ok(())
    }
}
