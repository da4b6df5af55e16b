//! Check that every requirement of the requested templates resolves.
//!
//! Validation runs the same pipeline as generation, against the ledger
//! loaded in memory and the offline deployer, and never writes anything
//! back. Dependencies satisfied by earlier templates in the same plan count
//! as satisfied, so a full-suite request validates the way it would deploy.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::deployer::{self, ExecuteOptions, NullDeployer};
use crate::resolver::RuntimeValues;

use super::{CliContext, parse_runtime_value, requested_or_all};

/// Command to validate a set of templates without touching the ledger.
#[derive(Args)]
pub struct ValidateCommand {
    /// Templates to validate. Defaults to every template in the catalog.
    names: Vec<String>,

    /// Runtime value to validate with. Repeatable.
    #[arg(long, value_name = "KEY=VALUE")]
    runtime: Vec<String>,

    /// Sender principal. Defaults to the network's well-known deployer.
    #[arg(long, value_name = "PRINCIPAL")]
    sender: Option<String>,
}

impl ValidateCommand {
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
            continue_on_failure: true,
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

        if report.failures.is_empty() {
            println!(
                "{} {} template(s) resolve and render on {}",
                "Valid:".green().bold(),
                report.deployed.len(),
                ctx.network
            );
            Ok(())
        } else {
            for failure in &report.failures {
                println!("{} {}:", "invalid".red().bold(), failure.template);
                for error in &failure.errors {
                    println!("    {error}");
                }
            }
            anyhow::bail!(
                "{} of {} template(s) failed validation",
                report.failures.len(),
                report.deployed.len() + report.failures.len()
            );
        }
    }
}
