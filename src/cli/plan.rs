//! Print the deployment order for a set of templates.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::sequencer;

use super::{CliContext, requested_or_all};

/// Command to compute and print a deployment plan.
///
/// Takes template names as positional arguments; with no arguments the
/// whole catalog is planned. The printed order is deterministic: producers
/// before consumers, ties broken by catalog hints and catalog position.
#[derive(Args)]
pub struct PlanCommand {
    /// Templates to plan. Defaults to every template in the catalog.
    names: Vec<String>,
}

impl PlanCommand {
    pub(crate) fn execute(self, ctx: &CliContext) -> Result<()> {
        let catalog = ctx.load_catalog()?;
        let requested = requested_or_all(&self.names, &catalog);
        let plan = sequencer::plan(&requested, &catalog).map_err(crate::core::ForgeError::from)?;

        println!(
            "{} for {} contract(s) on {}:",
            "Deployment plan".bold(),
            plan.order.len(),
            ctx.network.to_string().cyan()
        );
        println!();
        for (position, entry) in plan.order.iter().enumerate() {
            println!(
                "  {:>3}. {} {}",
                position + 1,
                entry.name.bright_white(),
                format!("({}/{})", entry.category, entry.subcategory).bright_black()
            );
        }

        if !plan.failures.is_empty() {
            println!();
            for failure in &plan.failures {
                println!("  {} {}", "cannot plan:".red(), failure);
            }
            anyhow::bail!("{} unsatisfied requirement(s) in the requested set", plan.failures.len());
        }
        Ok(())
    }
}
