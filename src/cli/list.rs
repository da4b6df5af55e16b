//! List catalog templates and their registry stage.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use crate::catalog::ContractCategory;
use crate::registry::{ContractStage, RegistryKey};

use super::CliContext;

/// Output format for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Command to list catalog templates with their current lifecycle stage.
///
/// The stage comes from the ledger at the registry path; templates never
/// recorded there show as `declared`.
#[derive(Args)]
pub struct ListCommand {
    /// Only list templates in this category.
    #[arg(long, value_enum)]
    category: Option<ContractCategory>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct ListItem {
    name: String,
    friendly_name: String,
    category: ContractCategory,
    subcategory: crate::catalog::ContractSubcategory,
    stage: ContractStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    contract_address: Option<String>,
}

impl ListCommand {
    pub(crate) fn execute(self, ctx: &CliContext) -> Result<()> {
        let catalog = ctx.load_catalog()?;
        let registry = ctx.load_registry()?;
        let snapshot = registry.snapshot();

        let items: Vec<ListItem> = catalog
            .entries()
            .iter()
            .filter(|entry| self.category.is_none_or(|c| entry.category == c))
            .map(|entry| {
                let key =
                    RegistryKey::new(entry.category, entry.subcategory, entry.name.clone());
                let record = snapshot.get(&key);
                ListItem {
                    name: entry.name.clone(),
                    friendly_name: entry.friendly_name.clone(),
                    category: entry.category,
                    subcategory: entry.subcategory,
                    stage: record.map_or(ContractStage::Declared, |e| e.stage()),
                    contract_address: record
                        .and_then(|e| e.deployed.as_ref())
                        .map(|d| d.contract_address.clone()),
                }
            })
            .collect();

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&items)?);
            }
            OutputFormat::Text => {
                println!(
                    "{} ({} template(s), network {}):",
                    "Catalog".bold(),
                    items.len(),
                    ctx.network.to_string().cyan()
                );
                println!();
                for item in &items {
                    let stage = match item.stage {
                        ContractStage::Declared => "declared".bright_black(),
                        ContractStage::Generated => "generated".yellow(),
                        ContractStage::Deployed => "deployed".green(),
                    };
                    println!(
                        "  {:<42} {:<22} {}",
                        item.name.bright_white(),
                        format!("{}/{}", item.category, item.subcategory).bright_black(),
                        stage
                    );
                    if let Some(address) = &item.contract_address {
                        println!("      {}", address.bright_black());
                    }
                }
            }
        }
        Ok(())
    }
}
