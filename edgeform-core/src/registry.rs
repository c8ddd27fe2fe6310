//! Registry - Aggregates subproviders into the root provider
//!
//! The registry is built once at process start and passed by reference to
//! whatever drives the resource lifecycle. It owns every subprovider, the
//! merged provider configuration schema and the name tables used to dispatch
//! host calls to resources and data sources.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{OperationMeta, Session, Transport};
use crate::config::{self, ConfigError, EdgegridConfig};
use crate::diag::{Diagnostic, Diagnostics};
use crate::provider::{DataSource, ProviderError, ProviderResult, Resource, Subprovider};
use crate::resource::{ResourceData, Value};
use crate::schema::{AttributeSchema, AttributeType, ResourceSchema, TypeError};

/// Name of the root provider
pub const PROVIDER_NAME: &str = "edgeform";

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("resource '{name}' is registered by both '{first}' and '{second}'")]
    DuplicateResource {
        name: String,
        first: String,
        second: String,
    },

    #[error("data source '{name}' is registered by both '{first}' and '{second}'")]
    DuplicateDataSource {
        name: String,
        first: String,
        second: String,
    },

    #[error("provider attribute '{name}' is declared twice (by '{subprovider}')")]
    DuplicateProviderAttribute { name: String, subprovider: String },

    #[error("'{registered}' is registered under a schema named '{declared}'")]
    SchemaNameMismatch { registered: String, declared: String },
}

struct Entry<T: ?Sized> {
    handler: Arc<T>,
    schema: Arc<ResourceSchema>,
    subprovider: &'static str,
}

/// Changes between two states of one resource
#[derive(Debug, Default)]
pub struct Plan {
    /// Attributes whose value changes after diff suppression
    pub changed: Vec<String>,
    pub diagnostics: Diagnostics,
}

pub struct ProviderRegistry {
    subproviders: Vec<Arc<dyn Subprovider>>,
    provider_schema: Arc<ResourceSchema>,
    resources: BTreeMap<String, Entry<dyn Resource>>,
    data_sources: BTreeMap<String, Entry<dyn DataSource>>,
    transport: Option<Arc<dyn Transport>>,
}

#[derive(Default)]
pub struct ProviderRegistryBuilder {
    subproviders: Vec<Arc<dyn Subprovider>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ProviderRegistryBuilder {
    pub fn subprovider(mut self, subprovider: Arc<dyn Subprovider>) -> Self {
        self.subproviders.push(subprovider);
        self
    }

    /// Transport used by sessions created in [`ProviderRegistry::configure`]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<ProviderRegistry, RegistryError> {
        let mut provider_schema = root_schema();
        let mut resources: BTreeMap<String, Entry<dyn Resource>> = BTreeMap::new();
        let mut data_sources: BTreeMap<String, Entry<dyn DataSource>> = BTreeMap::new();

        for subprovider in &self.subproviders {
            let owner = subprovider.name();

            for attr in subprovider.schema() {
                if provider_schema.attributes.contains_key(&attr.name) {
                    return Err(RegistryError::DuplicateProviderAttribute {
                        name: attr.name,
                        subprovider: owner.to_string(),
                    });
                }
                provider_schema = provider_schema.attribute(attr);
            }

            for (name, handler) in subprovider.resources() {
                if let Some(existing) = resources.get(&name) {
                    return Err(RegistryError::DuplicateResource {
                        name,
                        first: existing.subprovider.to_string(),
                        second: owner.to_string(),
                    });
                }
                let schema = checked_schema(&name, handler.schema())?;
                resources.insert(
                    name,
                    Entry {
                        handler,
                        schema,
                        subprovider: owner,
                    },
                );
            }

            for (name, handler) in subprovider.data_sources() {
                if let Some(existing) = data_sources.get(&name) {
                    return Err(RegistryError::DuplicateDataSource {
                        name,
                        first: existing.subprovider.to_string(),
                        second: owner.to_string(),
                    });
                }
                let schema = checked_schema(&name, handler.schema())?;
                data_sources.insert(
                    name,
                    Entry {
                        handler,
                        schema,
                        subprovider: owner,
                    },
                );
            }

            log::debug!(
                "registered subprovider {} {}",
                owner,
                subprovider.version()
            );
        }

        Ok(ProviderRegistry {
            subproviders: self.subproviders,
            provider_schema: Arc::new(provider_schema),
            resources,
            data_sources,
            transport: self.transport,
        })
    }
}

fn checked_schema(name: &str, schema: ResourceSchema) -> Result<Arc<ResourceSchema>, RegistryError> {
    if schema.resource_type != name {
        return Err(RegistryError::SchemaNameMismatch {
            registered: name.to_string(),
            declared: schema.resource_type,
        });
    }
    Ok(Arc::new(schema))
}

fn root_schema() -> ResourceSchema {
    ResourceSchema::new(PROVIDER_NAME)
        .with_description("Edge platform configuration provider")
        .attribute(
            AttributeSchema::new("edgerc", AttributeType::String)
                .optional()
                .with_description("Path to the credentials file (default ~/.edgerc.toml)"),
        )
        .attribute(
            AttributeSchema::new("config_section", AttributeType::String)
                .optional()
                .with_default(Value::from(config::DEFAULT_SECTION))
                .with_description("Section of the credentials file to use"),
        )
        .attribute(
            AttributeSchema::new(
                "config",
                AttributeType::List(Box::new(config::credentials_block())),
            )
            .optional()
            .with_max_items(1)
            .with_description("Inline credentials instead of a credentials file"),
        )
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    pub fn provider_schema(&self) -> &ResourceSchema {
        &self.provider_schema
    }

    pub fn subproviders(&self) -> impl Iterator<Item = &dyn Subprovider> {
        self.subproviders.iter().map(|s| s.as_ref())
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_names(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    pub fn resource_schema(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.resources.get(resource_type).map(|e| e.schema.as_ref())
    }

    pub fn data_source_schema(&self, data_source_type: &str) -> Option<&ResourceSchema> {
        self.data_sources
            .get(data_source_type)
            .map(|e| e.schema.as_ref())
    }

    /// Empty state for a resource instance
    pub fn new_resource_data(&self, resource_type: &str) -> Option<ResourceData> {
        self.resources
            .get(resource_type)
            .map(|e| ResourceData::new(Arc::clone(&e.schema)))
    }

    /// Empty state for a data source instance
    pub fn new_data_source_data(&self, data_source_type: &str) -> Option<ResourceData> {
        self.data_sources
            .get(data_source_type)
            .map(|e| ResourceData::new(Arc::clone(&e.schema)))
    }

    /// Empty provider configuration block
    pub fn provider_config(&self) -> ResourceData {
        ResourceData::new(Arc::clone(&self.provider_schema))
    }

    /// Configure the provider from its configuration block and the process environment
    pub fn configure(&self, config: &mut ResourceData) -> (OperationMeta, Diagnostics) {
        self.configure_with_env(config, |name| std::env::var(name).ok())
    }

    /// Configure the provider, looking up overrides through `env`
    ///
    /// Subproviders normalise the block first. Credentials then come from
    /// the inline `config` block when present, otherwise from the
    /// `config_section` section of the `edgerc` file.
    pub fn configure_with_env<F>(
        &self,
        config: &mut ResourceData,
        env: F,
    ) -> (OperationMeta, Diagnostics)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diags = validation_diagnostics(&self.provider_schema, config);
        for subprovider in &self.subproviders {
            diags.extend(subprovider.configure(config));
        }
        if diags.has_error() {
            return (OperationMeta::unconfigured(), diags);
        }

        let credentials = match load_credentials(config, env) {
            Ok(credentials) => credentials,
            Err(err) => {
                diags.extend(err.into());
                return (OperationMeta::unconfigured(), diags);
            }
        };

        let Some(transport) = &self.transport else {
            diags.push(
                Diagnostic::warning("no API transport is installed")
                    .with_detail("only injected clients can be used"),
            );
            return (OperationMeta::unconfigured(), diags);
        };

        log::debug!("configured provider for host {}", credentials.host);
        let session = Session::new(credentials, Arc::clone(transport));
        (OperationMeta::new(session), diags)
    }

    pub async fn create(
        &self,
        meta: &OperationMeta,
        resource_type: &str,
        d: &mut ResourceData,
    ) -> Diagnostics {
        let entry = match self.resource(resource_type) {
            Ok(entry) => entry,
            Err(diags) => return diags,
        };
        let mut scratch = d.clone();
        let result = entry.handler.create(meta, &mut scratch).await;
        if result.is_ok() && scratch.id().is_none() {
            return Diagnostic::error(format!(
                "creating {}: no resource ID was assigned",
                resource_type
            ))
            .into();
        }
        commit(d, scratch, result)
    }

    /// Refresh state; an instance whose remote object is gone comes back without an ID
    pub async fn read(
        &self,
        meta: &OperationMeta,
        resource_type: &str,
        d: &mut ResourceData,
    ) -> Diagnostics {
        match self.resource(resource_type) {
            Ok(entry) => {
                let mut scratch = d.clone();
                let result = entry.handler.read(meta, &mut scratch).await;
                commit(d, scratch, result)
            }
            Err(diags) => diags,
        }
    }

    pub async fn update(
        &self,
        meta: &OperationMeta,
        resource_type: &str,
        d: &mut ResourceData,
    ) -> Diagnostics {
        match self.resource(resource_type) {
            Ok(entry) => {
                let mut scratch = d.clone();
                let result = entry.handler.update(meta, &mut scratch).await;
                commit(d, scratch, result)
            }
            Err(diags) => diags,
        }
    }

    /// Delete, then drop the ID and every attribute
    pub async fn delete(
        &self,
        meta: &OperationMeta,
        resource_type: &str,
        d: &mut ResourceData,
    ) -> Diagnostics {
        let entry = match self.resource(resource_type) {
            Ok(entry) => entry,
            Err(diags) => return diags,
        };
        let mut scratch = d.clone();
        match entry.handler.delete(meta, &mut scratch).await {
            Ok(()) => {
                d.clear();
                Diagnostics::new()
            }
            Err(err) => err.into(),
        }
    }

    /// Import the instance named by `id`
    pub async fn import(
        &self,
        meta: &OperationMeta,
        resource_type: &str,
        id: &str,
    ) -> (Option<ResourceData>, Diagnostics) {
        let entry = match self.resource(resource_type) {
            Ok(entry) => entry,
            Err(diags) => return (None, diags),
        };
        let mut d = ResourceData::new(Arc::clone(&entry.schema)).with_id(id);
        match entry.handler.import(meta, &mut d).await {
            Ok(()) if d.id().is_none() => (
                None,
                Diagnostic::error(format!("cannot import non-existent remote object '{}'", id))
                    .into(),
            ),
            Ok(()) => (Some(d), Diagnostics::new()),
            Err(err) => (None, err.into()),
        }
    }

    pub async fn read_data_source(
        &self,
        meta: &OperationMeta,
        data_source_type: &str,
        d: &mut ResourceData,
    ) -> Diagnostics {
        let Some(entry) = self.data_sources.get(data_source_type) else {
            return Diagnostic::error(format!("unknown data source '{}'", data_source_type)).into();
        };
        let mut diags = validation_diagnostics(&entry.schema, d);
        if diags.has_error() {
            return diags;
        }
        let mut scratch = d.clone();
        let result = entry.handler.read(meta, &mut scratch).await;
        diags.extend(commit(d, scratch, result));
        diags
    }

    /// Check a planned state against the current one
    ///
    /// Validates the configured attributes, warns about deprecated ones,
    /// runs the resource's diff check and lists the attributes that change.
    pub fn plan(&self, resource_type: &str, old: &ResourceData, new: &ResourceData) -> Plan {
        let entry = match self.resource(resource_type) {
            Ok(entry) => entry,
            Err(diagnostics) => {
                return Plan {
                    changed: Vec::new(),
                    diagnostics,
                };
            }
        };

        let mut diagnostics = validation_diagnostics(&entry.schema, new);
        if let Err(err) = entry.handler.customize_diff(old, new) {
            diagnostics.extend(err.into());
        }

        let mut changed: Vec<String> = entry
            .schema
            .attributes
            .values()
            .filter(|attr| !attr.is_computed_only())
            .filter(|attr| attribute_changed(&entry.schema, attr, old, new))
            .map(|attr| attr.name.clone())
            .collect();
        changed.sort();

        Plan {
            changed,
            diagnostics,
        }
    }

    fn resource(&self, resource_type: &str) -> Result<&Entry<dyn Resource>, Diagnostics> {
        self.resources.get(resource_type).ok_or_else(|| {
            Diagnostic::error(format!("unknown resource type '{}'", resource_type)).into()
        })
    }
}

/// Whether a configured attribute differs from the stored one
///
/// Unset values fall back to the schema default. Empty strings and empty
/// collections count as unset. An optional computed attribute left out of
/// the configuration keeps whatever the provider stored.
fn attribute_changed(
    schema: &ResourceSchema,
    attr: &AttributeSchema,
    old: &ResourceData,
    new: &ResourceData,
) -> bool {
    let key = attr.name.as_str();
    let planned = new.get(key).filter(|value| !is_unset(value));
    if planned.is_none() && attr.computed {
        return false;
    }
    let stored = old.get(key).filter(|value| !is_unset(value));
    match (stored, planned) {
        (None, None) => false,
        (Some(before), Some(after)) => !schema.suppress_diff(key, before, after),
        _ => true,
    }
}

fn is_unset(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Map(map) => map.is_empty(),
        Value::Int(_) | Value::Bool(_) => false,
    }
}

/// Keep the updated copy of the state only when the callback succeeded
fn commit(d: &mut ResourceData, scratch: ResourceData, result: ProviderResult<()>) -> Diagnostics {
    match result {
        Ok(()) => {
            *d = scratch;
            Diagnostics::new()
        }
        Err(err) => err.into(),
    }
}

fn validation_diagnostics(schema: &ResourceSchema, d: &ResourceData) -> Diagnostics {
    let mut diags = Diagnostics::new();
    let configured = d
        .attributes()
        .iter()
        .filter(|(name, _)| {
            schema
                .attributes
                .get(*name)
                .is_none_or(|attr| !attr.is_computed_only())
        });
    if let Err(errors) = schema.validate(configured) {
        for error in errors {
            diags.push(type_error_diagnostic(&schema.resource_type, error));
        }
    }
    for (name, notice) in schema.deprecations(d.attributes().keys()) {
        diags.push(
            Diagnostic::warning(format!("'{}' is deprecated", name))
                .with_detail(notice)
                .with_attribute(name),
        );
    }
    diags
}

fn type_error_diagnostic(resource_type: &str, error: TypeError) -> Diagnostic {
    let attribute = match &error {
        TypeError::MissingRequired { name }
        | TypeError::UnknownAttribute { name }
        | TypeError::ComputedOnly { name }
        | TypeError::TooManyItems { name, .. } => Some(name.clone()),
        _ => None,
    };
    let diagnostic = Diagnostic::error(format!("{}: {}", resource_type, error));
    match attribute {
        Some(attribute) => diagnostic.with_attribute(attribute),
        None => diagnostic,
    }
}

fn load_credentials<F>(config: &ResourceData, env: F) -> Result<EdgegridConfig, ProviderError>
where
    F: Fn(&str) -> Option<String>,
{
    let blocks = config.get_blocks("config")?;
    match blocks.as_slice() {
        [] => {
            let edgerc = config.get_optional_string("edgerc")?.map(PathBuf::from);
            let section = config.get_string("config_section")?;
            Ok(EdgegridConfig::load(edgerc.as_deref(), &section, env)?)
        }
        [block] => Ok(EdgegridConfig::from_block(block)?),
        _ => Err(ConfigError::MultipleInlineConfigs.into()),
    }
}
