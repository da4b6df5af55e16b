//! Render templates, record them in the ledger, and run the deploy
//! pipeline against the offline deployer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::info;

use crate::deployer::{self, ExecuteOptions, NullDeployer};
use crate::registry::RegistryKey;
use crate::resolver::RuntimeValues;

use super::{CliContext, parse_runtime_value, requested_or_all};

/// Command to run the generation pipeline end to end.
///
/// Every requested template is planned, resolved, rendered, and recorded in
/// the ledger. Deployment goes through the offline deployer, which computes
/// the address each contract would live at without broadcasting anything.
/// The updated ledger is written back unless `--dry-run` is given.
#[derive(Args)]
pub struct GenerateCommand {
    /// Templates to generate. Defaults to every template in the catalog.
    names: Vec<String>,

    /// Runtime value shared by every template in the run. Repeatable.
    ///
    /// Values that parse as JSON are kept typed; anything else is a string.
    #[arg(long, value_name = "KEY=VALUE")]
    runtime: Vec<String>,

    /// Write each rendered contract body to this directory as `<name>.clar`.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Run the pipeline without writing the ledger back to disk.
    #[arg(long)]
    dry_run: bool,

    /// Sender principal. Defaults to the network's well-known deployer.
    #[arg(long, value_name = "PRINCIPAL")]
    sender: Option<String>,

    /// Stop at the first failed contract instead of continuing with
    /// independent ones.
    #[arg(long)]
    stop_on_failure: bool,
}

impl GenerateCommand {
    pub(crate) async fn execute(self, ctx: &CliContext) -> Result<()> {
        let catalog = ctx.load_catalog()?;
        let mut registry = ctx.load_registry()?;
        let renderer = ctx.renderer();

        let mut runtime_values = RuntimeValues::new();
        for raw in &self.runtime {
            let (key, value) = parse_runtime_value(raw)?;
            runtime_values.insert(key, value);
        }

        let requested = requested_or_all(&self.names, &catalog);
        let options = ExecuteOptions {
            network: ctx.network,
            sender: ctx.sender(self.sender.as_deref()),
            runtime_values,
            continue_on_failure: !self.stop_on_failure,
        };

        let report = deployer::execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &NullDeployer,
            &requested,
            &options,
        )
        .await?;

        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            for (name, _) in &report.deployed {
                let Some(entry) = catalog.get(name) else { continue };
                let key = RegistryKey::new(entry.category, entry.subcategory, name.clone());
                if let Some(record) = registry.get(&key).and_then(|e| e.generated.as_ref()) {
                    let path = dir.join(format!("{name}.clar"));
                    std::fs::write(&path, &record.source)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(contract = %name, path = %path.display(), "wrote rendered source");
                }
            }
        }

        if !self.dry_run {
            let path = ctx.registry_path();
            registry.save(&path)?;
            info!(path = %path.display(), "ledger saved");
        }

        for (name, receipt) in &report.deployed {
            if receipt.success {
                println!("  {} {} -> {}", "ok".green().bold(), name, receipt.contract_address);
            } else {
                let reason = receipt.error.as_deref().unwrap_or("deploy failed");
                println!("  {} {}: {}", "failed".red().bold(), name, reason);
            }
        }
        for failure in &report.failures {
            println!("  {} {}:", "failed".red().bold(), failure.template);
            for error in &failure.errors {
                println!("      {error}");
            }
        }
        println!();

        if report.is_success() {
            println!(
                "{} {} contract(s) generated on {}",
                "Success:".green().bold(),
                report.deployed.len(),
                ctx.network
            );
            Ok(())
        } else {
            anyhow::bail!(
                "{} of {} contract(s) failed",
                report.failures.len()
                    + report.deployed.iter().filter(|(_, r)| !r.success).count(),
                report.deployed.len() + report.failures.len()
            );
        }
    }
}
