//! akamai_dns_zone
//!
//! Zones are never deleted through the API; removal only stops tracking.

use std::sync::LazyLock;

use async_trait::async_trait;
use edgeform_core::client::{ClientAccessor, OperationMeta};
use edgeform_core::provider::{ProviderError, ProviderResult, Resource, verify_unchanged};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{
    AttributeSchema, AttributeType, ResourceSchema, suppress_case_difference, types,
};
use regex::Regex;

use super::client::{CreateZoneRequest, Dns, Zone};
use crate::upstream;

pub(crate) const RESOURCE_TYPE: &str = "akamai_dns_zone";

const ZONE_NAME_PATTERN: &str =
    r"^([a-zA-Z0-9_]([a-zA-Z0-9_-]{0,61}[a-zA-Z0-9_])?\.)+[a-zA-Z0-9-]{2,63}\.?$";

static ZONE_NAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(ZONE_NAME_PATTERN));

pub(crate) struct ZoneResource {
    pub(crate) client: ClientAccessor<dyn Dns>,
}

fn zone_name() -> AttributeType {
    AttributeType::Custom {
        name: "ZoneName".to_string(),
        base: Box::new(AttributeType::String),
        validate: |value| {
            let Value::String(name) = value else {
                return Err("Expected string".to_string());
            };
            let pattern = ZONE_NAME.as_ref().map_err(|e| e.to_string())?;
            if pattern.is_match(name) {
                Ok(())
            } else {
                Err(format!("'{}' is not a valid zone name", name))
            }
        },
    }
}

/// Zone document built from configuration; type-dependent fields are checked here
fn zone_from(d: &ResourceData) -> ProviderResult<Zone> {
    let zone_type = d.get_string("type")?.to_uppercase();
    let masters = d.get_string_list("masters")?;
    let target = d.get_optional_string("target")?;

    match zone_type.as_str() {
        "SECONDARY" if masters.is_empty() => {
            return Err(ProviderError::InvalidValue {
                field: "masters".to_string(),
                message: "masters list must be populated in secondary zone".to_string(),
            });
        }
        "ALIAS" if target.is_none() => {
            return Err(ProviderError::InvalidValue {
                field: "target".to_string(),
                message: "target must be populated in alias zone".to_string(),
            });
        }
        _ => {}
    }

    Ok(Zone {
        zone: d.get_string("zone")?,
        zone_type,
        masters,
        comment: d.get_optional_string("comment")?,
        sign_and_serve: d.get_bool("sign_and_serve")?,
        target,
        ..Default::default()
    })
}

#[async_trait]
impl Resource for ZoneResource {
    fn schema(&self) -> ResourceSchema {
        ResourceSchema::new(RESOURCE_TYPE)
            .with_description("Edge DNS zone")
            .attribute(AttributeSchema::new("contract", AttributeType::String).required())
            .attribute(AttributeSchema::new("group", AttributeType::String).optional())
            .attribute(AttributeSchema::new("zone", zone_name()).required())
            .attribute(
                AttributeSchema::new(
                    "type",
                    types::one_of(&[
                        "PRIMARY",
                        "SECONDARY",
                        "ALIAS",
                        "primary",
                        "secondary",
                        "alias",
                    ]),
                )
                .required()
                .with_diff_suppress(suppress_case_difference),
            )
            .attribute(
                AttributeSchema::new("masters", types::string_set())
                    .optional()
                    .with_description("Primary name servers of a secondary zone"),
            )
            .attribute(AttributeSchema::new("comment", AttributeType::String).optional())
            .attribute(
                AttributeSchema::new("target", AttributeType::String)
                    .optional()
                    .with_description("Zone an alias zone points to"),
            )
            .attribute(
                AttributeSchema::new("sign_and_serve", AttributeType::Bool)
                    .optional()
                    .with_default(Value::Bool(false)),
            )
            .attribute(AttributeSchema::new("activation_state", AttributeType::String).computed())
            .attribute(AttributeSchema::new("version_id", AttributeType::String).computed())
            .attribute(AttributeSchema::new("alias_count", AttributeType::Int).computed())
    }

    async fn create(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} create", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let zone = zone_from(d)?;
        let name = zone.zone.clone();

        client
            .create_zone(CreateZoneRequest {
                contract_id: d.get_string("contract")?,
                group_id: d.get_optional_string("group")?,
                zone,
            })
            .await
            .map_err(upstream("CreateZone"))?;
        d.set_id(name);
        self.read(meta, d).await
    }

    async fn read(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} read", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let name = d.require_id()?.to_string();

        let zone = match client.get_zone(&name).await {
            Ok(zone) => zone,
            Err(err) if err.is_not_found() => {
                log::warn!("zone {} no longer exists", name);
                d.clear_id();
                return Ok(());
            }
            Err(err) => return Err(upstream("GetZone")(err)),
        };

        let mut fields = vec![
            ("zone", Value::from(zone.zone)),
            ("type", Value::from(zone.zone_type)),
            ("masters", Value::from(zone.masters)),
            ("comment", Value::from(zone.comment.unwrap_or_default())),
            ("target", Value::from(zone.target.unwrap_or_default())),
            ("sign_and_serve", Value::Bool(zone.sign_and_serve)),
            (
                "activation_state",
                Value::from(zone.activation_state.unwrap_or_default()),
            ),
            ("version_id", Value::from(zone.version_id.unwrap_or_default())),
        ];
        if let Some(alias_count) = zone.alias_count {
            fields.push(("alias_count", Value::Int(alias_count)));
        }
        d.set_attrs(fields)
    }

    async fn update(&self, meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} update", RESOURCE_TYPE);
        let client = self.client.client(meta)?;
        let zone = zone_from(d)?;
        client
            .update_zone(zone)
            .await
            .map_err(upstream("UpdateZone"))?;
        self.read(meta, d).await
    }

    async fn delete(&self, _meta: &OperationMeta, d: &mut ResourceData) -> ProviderResult<()> {
        log::debug!("in {} delete", RESOURCE_TYPE);
        log::info!(
            "DNS API does not support zone deletion - zone {} will only be removed from state",
            d.id().unwrap_or_default()
        );
        Ok(())
    }

    fn customize_diff(&self, old: &ResourceData, new: &ResourceData) -> ProviderResult<()> {
        for field in ["zone", "contract"] {
            verify_unchanged(old, new, field)?;
        }
        Ok(())
    }
}
