use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use edgeform_core::config::{self, EdgegridConfig};
use edgeform_core::{Diagnostics, OperationMeta, ProviderRegistry, Severity, Value, id};

#[derive(Parser)]
#[command(name = "edgeform")]
#[command(about = "Edge platform configuration as declarative resources", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered subproviders, resources and data sources
    List,
    /// Print the schema of a resource or data source as JSON
    Schema {
        /// Resource or data source type; the provider schema when omitted
        name: Option<String>,
    },
    /// Show the credentials a section of the edgerc file resolves to
    Config {
        /// Path to the edgerc file
        #[arg(long)]
        edgerc: Option<PathBuf>,

        /// Section to read
        #[arg(long, default_value = config::DEFAULT_SECTION)]
        section: String,
    },
    /// Check that a composite ID has the expected number of parts
    Id {
        id: String,

        /// Expected number of parts
        #[arg(long, short)]
        parts: usize,

        /// Format shown when the ID does not match, such as "configID:policyID"
        #[arg(long, default_value = "")]
        hint: String,
    },
    /// Read a data source that needs no API credentials
    Read {
        name: String,

        /// String attribute, as key=value
        #[arg(long = "set", value_name = "KEY=VALUE")]
        strings: Vec<String>,

        /// Attribute with a JSON value, as key=json
        #[arg(long = "set-json", value_name = "KEY=JSON")]
        json: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => build_registry().map(|registry| run_list(&registry)),
        Commands::Schema { name } => {
            build_registry().and_then(|registry| run_schema(&registry, name.as_deref()))
        }
        Commands::Config { edgerc, section } => run_config(edgerc, &section),
        Commands::Id { id, parts, hint } => run_id(&id, parts, &hint),
        Commands::Read {
            name,
            strings,
            json,
        } => match build_registry() {
            Ok(registry) => run_read(&registry, &name, &strings, &json).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn build_registry() -> Result<ProviderRegistry, String> {
    let subproviders = edgeform_providers::subproviders();
    log::debug!("building registry from {} subproviders", subproviders.len());
    subproviders
        .into_iter()
        .fold(ProviderRegistry::builder(), |builder, subprovider| {
            builder.subprovider(subprovider)
        })
        .build()
        .map_err(|e| e.to_string())
}

fn run_list(registry: &ProviderRegistry) {
    println!("{}", "Subproviders:".bold());
    for subprovider in registry.subproviders() {
        println!(
            "  {} {}",
            subprovider.name().cyan(),
            subprovider.version().dimmed()
        );
    }

    println!("\n{}", "Resources:".bold());
    for name in registry.resource_names() {
        println!("  {}", name);
    }

    println!("\n{}", "Data sources:".bold());
    for name in registry.data_source_names() {
        println!("  {}", name);
    }
}

fn run_schema(registry: &ProviderRegistry, name: Option<&str>) -> Result<(), String> {
    let schema = match name {
        None => registry.provider_schema(),
        Some(name) => registry
            .resource_schema(name)
            .or_else(|| registry.data_source_schema(name))
            .ok_or_else(|| format!("unknown resource or data source '{}'", name))?,
    };
    let json = serde_json::to_string_pretty(&schema.to_json()).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn run_config(edgerc: Option<PathBuf>, section: &str) -> Result<(), String> {
    let credentials = EdgegridConfig::load(edgerc.as_deref(), section, |name| {
        std::env::var(name).ok()
    })
    .map_err(|e| e.to_string())?;

    println!("{} [{}]", "Section".bold(), section.cyan());
    println!("{:#?}", credentials);
    Ok(())
}

fn run_id(composite: &str, parts: usize, hint: &str) -> Result<(), String> {
    let decomposed = id::decompose(composite, parts, hint).map_err(|e| e.to_string())?;
    println!("{} {}", "✓".green().bold(), composite);
    for (index, part) in decomposed.iter().enumerate() {
        println!("  {}: {}", index, part);
    }
    Ok(())
}

async fn run_read(
    registry: &ProviderRegistry,
    name: &str,
    strings: &[String],
    json: &[String],
) -> Result<(), String> {
    let mut d = registry
        .new_data_source_data(name)
        .ok_or_else(|| format!("unknown data source '{}'", name))?;

    for arg in strings {
        let (key, value) = split_assignment(arg)?;
        d = d.with_attribute(key, value);
    }
    for arg in json {
        let (key, raw) = split_assignment(arg)?;
        let parsed: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| format!("invalid JSON for '{}': {}", key, e))?;
        let value = Value::from_json(&parsed)
            .ok_or_else(|| format!("'{}' cannot be null", key))?;
        d = d.with_attribute(key, value);
    }

    log::debug!("reading data source {}", name);
    let diags = registry
        .read_data_source(&OperationMeta::unconfigured(), name, &mut d)
        .await;
    print_diagnostics(&diags);
    if diags.has_error() {
        return Err(format!("reading {} failed", name));
    }

    let mut attributes: Vec<(&String, &Value)> = d.attributes().iter().collect();
    attributes.sort_by(|a, b| a.0.cmp(b.0));
    let state: serde_json::Map<String, serde_json::Value> = attributes
        .into_iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();

    println!("{} {}", "id:".bold(), d.id().unwrap_or("-"));
    let json = serde_json::to_string_pretty(&state).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn split_assignment(arg: &str) -> Result<(&str, &str), String> {
    arg.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", arg))
}

fn print_diagnostics(diags: &Diagnostics) {
    for diag in diags.iter() {
        let label = match diag.severity {
            Severity::Error => "Error:".red().bold(),
            Severity::Warning => "Warning:".yellow().bold(),
        };
        match &diag.attribute {
            Some(attribute) => eprintln!("{} {} ({})", label, diag.summary, attribute),
            None => eprintln!("{} {}", label, diag.summary),
        }
        if let Some(detail) = &diag.detail {
            eprintln!("  {}", detail.dimmed());
        }
    }
}
