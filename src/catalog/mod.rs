//! Template catalog: the immutable, loaded-once list of contract templates.
//!
//! A [`Catalog`] is assembled either from a TOML file ([`Catalog::load`]) or
//! statically from domain partitions ([`Catalog::new`], see [`aibtc`]). Each
//! [`TemplateEntry`] declares the references its body needs resolved before
//! rendering: trait references, address references, contract-address
//! references, and free-form runtime values.
//!
//! # Catalog format
//!
//! ```toml
//! [[templates]]
//! name = "aibtc-treasury"
//! friendly_name = "aibtc Treasury"
//! template_path = "extensions/aibtc-treasury.clar"
//! category = "extensions"
//! subcategory = "treasury"
//! deployment_order = 6          # optional ordering hint
//! clarity_version = 2           # optional, defaults to the node's latest
//!
//! [[templates.required_traits]]
//! key = "DAO_EXTENSION"         # symbolic key into the Known Traits table
//! template_key = "extension_trait"
//!
//! [[templates.required_contract_addresses]]
//! template_key = "base_dao_contract"
//! category = "base"
//! subcategory = "dao"
//!
//! [[templates.required_runtime_values]]
//! template_key = "stx_amount"
//! ```
//!
//! # Validation
//!
//! Load-time validation rejects:
//! - duplicate `name` entries anywhere in the catalog (never silently
//!   overwritten)
//! - (category, subcategory) pairs outside the closed namespace
//!
//! After load the catalog is immutable and safe to share read-only across
//! concurrent resolutions.

pub mod aibtc;
pub mod category;

pub use category::{ContractCategory, ContractSubcategory};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::ForgeError;

/// A symbolic trait requirement, resolved via the Known Traits table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitReference {
    /// Symbolic key into the per-network Known Traits table.
    pub key: String,
    /// Substitution marker this resolves into in the template body.
    pub template_key: String,
}

/// A symbolic address requirement, resolved via the Known Addresses table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressReference {
    /// Symbolic key into the per-network Known Addresses table.
    pub key: String,
    /// Substitution marker this resolves into in the template body.
    pub template_key: String,
}

/// A requirement on another contract's deployed address, matched by
/// (category, subcategory) rather than by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddressReference {
    /// Substitution marker this resolves into in the template body.
    pub template_key: String,
    /// Category of the producer contract.
    pub category: ContractCategory,
    /// Subcategory of the producer contract.
    pub subcategory: ContractSubcategory,
}

/// A free-form value supplied by the caller at invocation time; opaque to
/// the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeValueReference {
    /// Key into the caller-supplied runtime value map.
    pub template_key: String,
}

/// One immutable catalog record: a contract template plus the declaration of
/// everything it needs resolved before rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEntry {
    /// Unique name across the whole catalog; doubles as the deployed
    /// contract name.
    pub name: String,
    /// Human-readable display name.
    pub friendly_name: String,
    /// Template body path, relative to the templates directory.
    pub template_path: String,
    /// Category the rendered contract belongs to.
    pub category: ContractCategory,
    /// Subcategory the rendered contract belongs to.
    pub subcategory: ContractSubcategory,
    /// Optional ordering hint; lower deploys earlier among otherwise
    /// unordered templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_order: Option<u32>,
    /// Clarity version to deploy with; `None` lets the node pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarity_version: Option<u8>,
    /// Trait references to resolve via Known Traits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_traits: Vec<TraitReference>,
    /// Address references to resolve via Known Addresses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_addresses: Vec<AddressReference>,
    /// Contract-address references to resolve against the registry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_contract_addresses: Vec<ContractAddressReference>,
    /// Runtime values the caller must supply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_runtime_values: Vec<RuntimeValueReference>,
}

impl TemplateEntry {
    /// Every declared substitution marker, across all four requirement kinds.
    pub fn declared_template_keys(&self) -> impl Iterator<Item = &str> {
        self.required_traits
            .iter()
            .map(|r| r.template_key.as_str())
            .chain(self.required_addresses.iter().map(|r| r.template_key.as_str()))
            .chain(self.required_contract_addresses.iter().map(|r| r.template_key.as_str()))
            .chain(self.required_runtime_values.iter().map(|r| r.template_key.as_str()))
    }
}

/// On-disk catalog file shape.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<TemplateEntry>,
}

/// The immutable Registry Catalog: all template declarations, validated at
/// load, ordered as declared.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<TemplateEntry>,
    /// name -> index into `entries`, for O(1) lookup and declaration-order
    /// tie-breaking.
    by_name: HashMap<String, usize>,
}

impl Catalog {
    /// Assemble a catalog from statically composed entries, validating
    /// uniqueness and category pairs.
    pub fn new(entries: Vec<TemplateEntry>) -> Result<Self, ForgeError> {
        let mut by_name = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            entry.category.validate_pair(entry.subcategory)?;
            for reference in &entry.required_contract_addresses {
                reference.category.validate_pair(reference.subcategory)?;
            }
            if by_name.insert(entry.name.clone(), index).is_some() {
                return Err(ForgeError::DuplicateTemplate {
                    name: entry.name.clone(),
                });
            }
        }
        Ok(Self { entries, by_name })
    }

    /// Load and validate a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile =
            toml::from_str(&content).map_err(|e| ForgeError::CatalogParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Self::new(file.templates)
    }

    /// Look up a template by its unique name.
    pub fn get(&self, name: &str) -> Option<&TemplateEntry> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    /// Declaration-order position of a template, used as the final
    /// tie-breaker for deterministic planning.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// All templates producing into a (category, subcategory) pair, in
    /// declaration order.
    pub fn producers(
        &self,
        category: ContractCategory,
        subcategory: ContractSubcategory,
    ) -> Vec<&TemplateEntry> {
        self.entries
            .iter()
            .filter(|e| e.category == category && e.subcategory == subcategory)
            .collect()
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, category: ContractCategory, subcategory: ContractSubcategory) -> TemplateEntry {
        TemplateEntry {
            name: name.to_string(),
            friendly_name: name.to_string(),
            template_path: format!("{name}.clar"),
            category,
            subcategory,
            deployment_order: None,
            clarity_version: None,
            required_traits: vec![],
            required_addresses: vec![],
            required_contract_addresses: vec![],
            required_runtime_values: vec![],
        }
    }

    #[test]
    fn test_duplicate_names_rejected_at_load() {
        let result = Catalog::new(vec![
            entry("toggle-resource", ContractCategory::Actions, ContractSubcategory::Resources),
            entry("toggle-resource", ContractCategory::Actions, ContractSubcategory::Resources),
        ]);
        match result {
            Err(ForgeError::DuplicateTemplate { name }) => assert_eq!(name, "toggle-resource"),
            other => panic!("expected DuplicateTemplate, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pair_rejected_at_load() {
        let result = Catalog::new(vec![entry(
            "broken",
            ContractCategory::Base,
            ContractSubcategory::Messaging,
        )]);
        assert!(matches!(result, Err(ForgeError::InvalidCategoryPair { .. })));
    }

    #[test]
    fn test_invalid_reference_pair_rejected_at_load() {
        let mut e = entry("consumer", ContractCategory::Extensions, ContractSubcategory::Treasury);
        e.required_contract_addresses.push(ContractAddressReference {
            template_key: "dep".to_string(),
            category: ContractCategory::Token,
            subcategory: ContractSubcategory::Treasury,
        });
        assert!(matches!(Catalog::new(vec![e]), Err(ForgeError::InvalidCategoryPair { .. })));
    }

    #[test]
    fn test_producer_lookup_in_declaration_order() {
        let catalog = Catalog::new(vec![
            entry("first", ContractCategory::Extensions, ContractSubcategory::Treasury),
            entry("other", ContractCategory::Extensions, ContractSubcategory::Messaging),
            entry("second", ContractCategory::Extensions, ContractSubcategory::Treasury),
        ])
        .unwrap();

        let producers = catalog.producers(ContractCategory::Extensions, ContractSubcategory::Treasury);
        let names: Vec<_> = producers.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(catalog.position("other"), Some(1));
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_src = r#"
            [[templates]]
            name = "aibtc-treasury"
            friendly_name = "aibtc Treasury"
            template_path = "extensions/aibtc-treasury.clar"
            category = "extensions"
            subcategory = "treasury"
            deployment_order = 6

            [[templates.required_traits]]
            key = "DAO_EXTENSION"
            template_key = "extension_trait"

            [[templates.required_runtime_values]]
            template_key = "dao_manifest"
        "#;
        let file: CatalogFile = toml::from_str(toml_src).unwrap();
        let catalog = Catalog::new(file.templates).unwrap();
        let entry = catalog.get("aibtc-treasury").unwrap();
        assert_eq!(entry.deployment_order, Some(6));
        assert_eq!(entry.required_traits[0].key, "DAO_EXTENSION");
        let keys: Vec<_> = entry.declared_template_keys().collect();
        assert_eq!(keys, ["extension_trait", "dao_manifest"]);
    }
}
