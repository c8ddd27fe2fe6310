//! Edge DNS subprovider
//!
//! Besides its resources this subprovider owns the legacy `dns_section` and
//! `dns` provider settings, which it folds into the root `config_section`
//! and `config` settings during configure.

use std::collections::BTreeMap;
use std::sync::Arc;

use edgeform_core::client::{ClientAccessor, Session};
use edgeform_core::config::{ConfigError, DEFAULT_SECTION, credentials_block};
use edgeform_core::diag::Diagnostics;
use edgeform_core::provider::{DataSource, ProviderError, Resource, Subprovider};
use edgeform_core::resource::{ResourceData, Value};
use edgeform_core::schema::{AttributeSchema, AttributeType};

pub mod client;
mod data_sources;
mod record;
mod zone;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{Dns, HttpDns};

/// Update anytime the subprovider adds new features
pub const PROVIDER_VERSION: &str = "v0.8.3";

fn session_client(session: &Session) -> Arc<dyn Dns> {
    Arc::new(HttpDns::new(session.clone()))
}

fn deprecated_alias(name: &str) -> String {
    format!(
        "The setting \"{}\" has been deprecated. Use \"config\" or \"config_section\" instead.",
        name
    )
}

pub struct DnsProvider {
    client: ClientAccessor<dyn Dns>,
}

impl DnsProvider {
    pub fn new() -> Self {
        Self {
            client: ClientAccessor::new(session_client),
        }
    }

    /// Subprovider whose resources always use `client`
    pub fn with_client(client: Arc<dyn Dns>) -> Self {
        Self {
            client: ClientAccessor::new(session_client).with_client(client),
        }
    }
}

impl Default for DnsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Move the legacy settings onto the root ones
fn fold_legacy_settings(config: &mut ResourceData) -> Result<(), ProviderError> {
    let mut inline = None;
    for key in ["dns", "config"] {
        let blocks = config.get_blocks(key)?;
        if blocks.is_empty() {
            continue;
        }
        if inline.is_some() {
            return Err(ConfigError::MultipleInlineConfigs.into());
        }
        inline = Some(blocks);
    }
    if let Some(blocks) = inline {
        config.set("config", Value::List(blocks.into_iter().map(Value::Map).collect()))?;
    }

    for key in ["dns_section", "config_section"] {
        if let Some(section) = config.get_optional_string(key)?
            && section != DEFAULT_SECTION
        {
            config.set("config_section", section)?;
            break;
        }
    }
    Ok(())
}

impl Subprovider for DnsProvider {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn version(&self) -> &'static str {
        PROVIDER_VERSION
    }

    fn schema(&self) -> Vec<AttributeSchema> {
        vec![
            AttributeSchema::new("dns_section", AttributeType::String)
                .optional()
                .with_default(Value::from(DEFAULT_SECTION))
                .deprecated(deprecated_alias("dns_section")),
            AttributeSchema::new("dns", AttributeType::List(Box::new(credentials_block())))
                .optional()
                .with_max_items(1)
                .deprecated(deprecated_alias("dns")),
        ]
    }

    fn resources(&self) -> BTreeMap<String, Arc<dyn Resource>> {
        let mut resources: BTreeMap<String, Arc<dyn Resource>> = BTreeMap::new();
        resources.insert(
            zone::RESOURCE_TYPE.to_string(),
            Arc::new(zone::ZoneResource {
                client: self.client.clone(),
            }),
        );
        resources.insert(
            record::RESOURCE_TYPE.to_string(),
            Arc::new(record::RecordResource {
                client: self.client.clone(),
            }),
        );
        resources
    }

    fn data_sources(&self) -> BTreeMap<String, Arc<dyn DataSource>> {
        data_sources::all(&self.client)
    }

    fn configure(&self, config: &mut ResourceData) -> Diagnostics {
        log::debug!("START Configure");
        match fold_legacy_settings(config) {
            Ok(()) => Diagnostics::new(),
            Err(err) => err.into(),
        }
    }
}
