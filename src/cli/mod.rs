//! Command-line interface for daoforge.
//!
//! Each subcommand lives in its own module with its own argument struct and
//! execution logic, so commands can be tested independently and new commands
//! slot in without touching the others.
//!
//! # Available Commands
//!
//! - `plan` - Compute and print the deployment order for a set of templates
//! - `generate` - Render templates, record them in the ledger, and run the
//!   deploy pipeline against the offline deployer
//! - `list` - List catalog templates and their registry stage
//! - `validate` - Resolve every requirement of the requested templates and
//!   report everything that is unsatisfied
//!
//! # Global Options
//!
//! All commands share `--network`, `--catalog`, `--templates-dir`,
//! `--registry`, `--verbose`, and `--quiet`. When `--catalog` is omitted the
//! built-in aibtc catalog is used; when `--registry` is omitted the ledger
//! lives at `registry.<network>.toml` in the working directory.

mod generate;
mod list;
mod plan;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::catalog::{self, Catalog};
use crate::core::ForgeError;
use crate::network::Network;
use crate::registry::ContractRegistry;
use crate::renderer::TemplateRenderer;
use crate::symbols;

/// Root command for the daoforge CLI.
///
/// Uses the `clap` derive API; options marked `global = true` are available
/// to every subcommand.
#[derive(Parser)]
#[command(name = "daoforge", version, about = "Template-driven Stacks contract generation and deployment ordering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Sets the log filter to `debug` unless `RUST_LOG` is already set.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors for automation.
    ///
    /// Mutually exclusive with `--verbose`.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Target network for symbol lookups, the ledger, and deployment.
    #[arg(short, long, global = true, value_enum, default_value_t = Network::Devnet)]
    network: Network,

    /// Path to a TOML template catalog.
    ///
    /// When omitted, the built-in aibtc DAO catalog is used.
    #[arg(long, global = true, value_name = "PATH")]
    catalog: Option<PathBuf>,

    /// Directory holding the Clarity template bodies.
    #[arg(long, global = true, value_name = "DIR", default_value = "templates")]
    templates_dir: PathBuf,

    /// Path to the registry ledger file.
    ///
    /// Defaults to `registry.<network>.toml` in the working directory.
    #[arg(long, global = true, value_name = "PATH")]
    registry: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compute the deployment order for a set of templates.
    Plan(plan::PlanCommand),
    /// Render templates and run the deploy pipeline offline.
    Generate(generate::GenerateCommand),
    /// List catalog templates and their registry stage.
    List(list::ListCommand),
    /// Check that every requirement of the requested templates resolves.
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();
        let ctx = CliContext {
            network: self.network,
            catalog_path: self.catalog,
            templates_dir: self.templates_dir,
            registry_path: self.registry,
        };

        match self.command {
            Commands::Plan(cmd) => cmd.execute(&ctx),
            Commands::Generate(cmd) => cmd.execute(&ctx).await,
            Commands::List(cmd) => cmd.execute(&ctx),
            Commands::Validate(cmd) => cmd.execute(&ctx).await,
        }
    }

    fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::EnvFilter::from_default_env()
        } else if self.verbose {
            tracing_subscriber::EnvFilter::new("debug")
        } else if self.quiet {
            tracing_subscriber::EnvFilter::new("error")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Shared state handed to every subcommand: the target network and the
/// paths resolved from the global options.
pub(crate) struct CliContext {
    pub network: Network,
    pub catalog_path: Option<PathBuf>,
    pub templates_dir: PathBuf,
    pub registry_path: Option<PathBuf>,
}

impl CliContext {
    /// Load the catalog named by `--catalog`, or the built-in aibtc one.
    pub fn load_catalog(&self) -> Result<Catalog, ForgeError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => catalog::aibtc::catalog(),
        }
    }

    /// Where the ledger lives for this invocation.
    pub fn registry_path(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("registry.{}.toml", self.network)))
    }

    /// Load the ledger if it exists, otherwise start an empty registry for
    /// the target network. A ledger recorded for a different network is a
    /// hard error, not a fresh start.
    pub fn load_registry(&self) -> Result<ContractRegistry, ForgeError> {
        let path = self.registry_path();
        if path.exists() {
            let registry = ContractRegistry::load(&path)?;
            if registry.network() != self.network {
                return Err(ForgeError::NetworkMismatch {
                    expected: self.network,
                    actual: registry.network(),
                });
            }
            Ok(registry)
        } else {
            Ok(ContractRegistry::new(self.network))
        }
    }

    pub fn renderer(&self) -> TemplateRenderer {
        TemplateRenderer::new(self.templates_dir.as_path())
    }

    /// Sender principal for this run: the explicit override, or the
    /// network's well-known deployer.
    pub fn sender(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .unwrap_or_else(|| symbols::deployer(self.network).to_owned())
    }
}

/// Parse one `KEY=VALUE` runtime argument. The value is parsed as JSON when
/// it looks like JSON, and kept as a plain string otherwise, so
/// `--runtime token_max_supply=1000000000` arrives as a number while
/// `--runtime token_name=MyToken` stays a string.
pub(crate) fn parse_runtime_value(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        anyhow::anyhow!("invalid runtime value '{raw}': expected KEY=VALUE")
    })?;
    if key.is_empty() {
        anyhow::bail!("invalid runtime value '{raw}': empty key");
    }
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), parsed))
}

/// Names to operate on: the explicit request, or the whole catalog when the
/// request is empty.
pub(crate) fn requested_or_all(names: &[String], catalog: &Catalog) -> Vec<String> {
    if names.is_empty() {
        catalog.entries().iter().map(|e| e.name.clone()).collect()
    } else {
        names.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_value_parses_json_number() {
        let (key, value) = parse_runtime_value("token_max_supply=1000000000").unwrap();
        assert_eq!(key, "token_max_supply");
        assert_eq!(value, Value::from(1_000_000_000u64));
    }

    #[test]
    fn runtime_value_keeps_plain_string() {
        let (key, value) = parse_runtime_value("token_name=MyToken").unwrap();
        assert_eq!(key, "token_name");
        assert_eq!(value, Value::String("MyToken".into()));
    }

    #[test]
    fn runtime_value_allows_equals_in_value() {
        let (key, value) = parse_runtime_value("dao_charter_text=a=b").unwrap();
        assert_eq!(key, "dao_charter_text");
        assert_eq!(value, Value::String("a=b".into()));
    }

    #[test]
    fn runtime_value_rejects_missing_separator() {
        assert!(parse_runtime_value("token_name").is_err());
        assert!(parse_runtime_value("=value").is_err());
    }

    #[test]
    fn cli_parses_global_network() {
        let cli = Cli::try_parse_from(["daoforge", "--network", "testnet", "list"]).unwrap();
        assert_eq!(cli.network, Network::Testnet);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["daoforge", "-v", "-q", "list"]).is_err());
    }
}
