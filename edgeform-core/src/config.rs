//! EdgeGrid credentials
//!
//! Credentials come from an inline `config` block or from a section of a
//! TOML credentials file (`~/.edgerc.toml` by default):
//!
//! ```toml
//! [default]
//! host = "akab-xxxx.luna.akamaiapis.net"
//! client_token = "akab-..."
//! client_secret = "..."
//! access_token = "akab-..."
//! ```
//!
//! Environment variables `EDGEFORM_<KEY>` (section `default`) or
//! `EDGEFORM_<SECTION>_<KEY>` override individual keys.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::resource::Value;
use crate::schema::{AttributeSchema, AttributeType};

pub const DEFAULT_SECTION: &str = "default";
pub const DEFAULT_EDGERC_FILE: &str = ".edgerc.toml";
const ENV_PREFIX: &str = "EDGEFORM";

const REQUIRED_KEYS: [&str; 4] = ["host", "client_token", "client_secret", "access_token"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("provider is not configured with API credentials")]
    NotConfigured,

    #[error("reading credentials file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing credentials file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("section '{section}' not found in {}", path.display())]
    SectionNotFound { section: String, path: PathBuf },

    #[error("required key '{key}' is missing from section '{section}'")]
    MissingKey { section: String, key: String },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("only one inline config section can be defined")]
    MultipleInlineConfigs,

    #[error("no home directory to look up {DEFAULT_EDGERC_FILE} in")]
    NoHomeDirectory,
}

/// Credentials for one API client
#[derive(Clone, PartialEq, Eq)]
pub struct EdgegridConfig {
    pub host: String,
    pub client_token: String,
    pub client_secret: String,
    pub access_token: String,
    /// Account to act on behalf of (account switching)
    pub account_key: Option<String>,
    /// Largest request body, in bytes, covered by the request signature
    pub max_body: u64,
}

impl fmt::Debug for EdgegridConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgegridConfig")
            .field("host", &self.host)
            .field("client_token", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("account_key", &self.account_key)
            .field("max_body", &self.max_body)
            .finish()
    }
}

impl EdgegridConfig {
    pub const DEFAULT_MAX_BODY: u64 = 131072;

    /// Load a section from a credentials file, applying environment overrides
    pub fn load<F>(path: Option<&Path>, section: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_edgerc_path().ok_or(ConfigError::NoHomeDirectory)?,
        };

        let mut values = HashMap::new();
        match std::fs::read_to_string(&path) {
            Ok(content) => values = read_section(&path, &content, section)?,
            // Environment variables alone are enough when there is no file
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && env_complete(section, &env) => {
                log::debug!("{} not found, using environment credentials", path.display());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        }

        for key in REQUIRED_KEYS.iter().chain(["account_key", "max_body"].iter()) {
            if let Some(value) = env(&env_var(section, key)) {
                values.insert(key.to_string(), value);
            }
        }

        Self::from_values(section, values)
    }

    /// Build from an inline `config` block
    pub fn from_block(block: &BTreeMap<String, Value>) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (key, value) in block {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Int(n) => n.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: key.clone(),
                        message: format!("unsupported value {}", other.to_json()),
                    });
                }
            };
            values.insert(key.clone(), value);
        }
        Self::from_values("config", values)
    }

    fn from_values(section: &str, mut values: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut take = |key: &str| -> Result<String, ConfigError> {
            values
                .remove(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::MissingKey {
                    section: section.to_string(),
                    key: key.to_string(),
                })
        };

        let host = take("host")?;
        let client_token = take("client_token")?;
        let client_secret = take("client_secret")?;
        let access_token = take("access_token")?;
        let account_key = values.remove("account_key").filter(|v| !v.is_empty());
        let max_body = match values.remove("max_body") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: "max_body".to_string(),
                message: e.to_string(),
            })?,
            None => Self::DEFAULT_MAX_BODY,
        };

        if host.contains("://") || host.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "host".to_string(),
                message: format!("'{}' must be a bare hostname", host),
            });
        }

        Ok(Self {
            host,
            client_token,
            client_secret,
            access_token,
            account_key,
            max_body,
        })
    }
}

/// `~/.edgerc.toml`
pub fn default_edgerc_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_EDGERC_FILE))
}

/// Schema of the inline credentials block
pub fn credentials_block() -> AttributeType {
    AttributeType::Block(
        [
            AttributeSchema::new("host", AttributeType::String).required(),
            AttributeSchema::new("client_token", AttributeType::String)
                .required()
                .sensitive(),
            AttributeSchema::new("client_secret", AttributeType::String)
                .required()
                .sensitive(),
            AttributeSchema::new("access_token", AttributeType::String)
                .required()
                .sensitive(),
            AttributeSchema::new("account_key", AttributeType::String).optional(),
            AttributeSchema::new("max_body", AttributeType::Int).optional(),
        ]
        .into_iter()
        .map(|attr| (attr.name.clone(), attr))
        .collect(),
    )
}

fn read_section(
    path: &Path,
    content: &str,
    section: &str,
) -> Result<HashMap<String, String>, ConfigError> {
    let table: toml::Table = content.parse().map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let section_table = table
        .get(section)
        .and_then(toml::Value::as_table)
        .ok_or_else(|| ConfigError::SectionNotFound {
            section: section.to_string(),
            path: path.to_path_buf(),
        })?;

    section_table
        .iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(n) => n.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: key.clone(),
                        message: format!("unsupported value {}", other),
                    });
                }
            };
            Ok((key.clone(), value))
        })
        .collect()
}

fn env_var(section: &str, key: &str) -> String {
    let key = key.to_uppercase();
    if section == DEFAULT_SECTION {
        format!("{}_{}", ENV_PREFIX, key)
    } else {
        format!(
            "{}_{}_{}",
            ENV_PREFIX,
            section.to_uppercase().replace('-', "_"),
            key
        )
    }
}

fn env_complete<F: Fn(&str) -> Option<String>>(section: &str, env: &F) -> bool {
    REQUIRED_KEYS
        .iter()
        .all(|key| env(&env_var(section, key)).is_some())
}
