//! Reference resolution: turning a template's declared requirements into one
//! concrete parameter set.
//!
//! [`resolve`] runs four independent passes over a [`TemplateEntry`]'s
//! declarations, one per requirement kind:
//!
//! 1. trait references against the Known Traits table
//! 2. address references against the Known Addresses table
//! 3. contract-address references against the registry snapshot's live
//!    (deployed, `success = true`) producers
//! 4. runtime values against the caller-supplied map
//!
//! The passes are deliberately not fail-fast: all four always run, and every
//! unsatisfied requirement is returned together, so one report surfaces every
//! missing dependency instead of forcing multi-round-trip diagnosis in
//! non-interactive deployment runs.
//!
//! Resolution is pure and side-effect-free: it reads the catalog entry, the
//! static symbol tables, and a fixed snapshot, and may run freely in
//! parallel across independent templates.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{ContractCategory, ContractSubcategory, TemplateEntry};
use crate::core::ForgeError;
use crate::network::Network;
use crate::registry::RegistrySnapshot;
use crate::symbols;

/// One unsatisfied requirement discovered during resolution.
///
/// Symbol-table misses are always fatal for the template (a miswired
/// declaration or a missing network entry); dependency errors are fatal for
/// the affected template only and clear once the producer deploys.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("unknown trait reference '{key}'")]
    UnknownTrait {
        key: String,
        suggestion: Option<String>,
    },

    #[error("unknown address reference '{key}'")]
    UnknownAddress {
        key: String,
        suggestion: Option<String>,
    },

    #[error("no deployed contract satisfies {category}/{subcategory}")]
    DependencyNotDeployed {
        category: ContractCategory,
        subcategory: ContractSubcategory,
    },

    #[error("ambiguous producer for {category}/{subcategory}: {}", producers.join(", "))]
    AmbiguousProducer {
        category: ContractCategory,
        subcategory: ContractSubcategory,
        producers: Vec<String>,
    },

    #[error("missing runtime value '{key}'")]
    MissingRuntimeValue { key: String },

    #[error("snapshot taken on {actual}, resolving for {expected}")]
    NetworkMismatch { expected: Network, actual: Network },
}

impl ResolutionError {
    /// Lift into the crate error type, attaching the owning template's name.
    pub fn into_forge(self, template: &str, network: Network) -> ForgeError {
        match self {
            ResolutionError::UnknownTrait { key, suggestion } => ForgeError::UnknownTrait {
                key,
                network,
                suggestion,
            },
            ResolutionError::UnknownAddress { key, suggestion } => ForgeError::UnknownAddress {
                key,
                network,
                suggestion,
            },
            ResolutionError::DependencyNotDeployed {
                category,
                subcategory,
            } => ForgeError::DependencyNotDeployed {
                template: template.to_string(),
                category: category.to_string(),
                subcategory: subcategory.to_string(),
            },
            ResolutionError::AmbiguousProducer {
                category,
                subcategory,
                producers,
            } => ForgeError::AmbiguousProducer {
                template: template.to_string(),
                category: category.to_string(),
                subcategory: subcategory.to_string(),
                producers,
            },
            ResolutionError::MissingRuntimeValue { key } => ForgeError::MissingRuntimeValue {
                template: template.to_string(),
                key,
            },
            ResolutionError::NetworkMismatch { expected, actual } => {
                ForgeError::NetworkMismatch { expected, actual }
            }
        }
    }
}

/// The merged key -> value map a fully resolved template renders with.
///
/// Backed by a `BTreeMap` so iteration order (and therefore rendered output)
/// is deterministic for identical inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameters {
    values: BTreeMap<String, Value>,
}

impl ResolvedParameters {
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Caller-supplied runtime values, opaque to the resolver.
pub type RuntimeValues = BTreeMap<String, Value>;

/// Resolve every declared requirement of `entry` against the symbol tables,
/// the registry snapshot, and the caller-supplied runtime values.
///
/// Returns the merged parameter map, or every unsatisfied requirement across
/// all four kinds.
pub fn resolve(
    entry: &TemplateEntry,
    network: Network,
    snapshot: &RegistrySnapshot,
    runtime_values: &RuntimeValues,
) -> Result<ResolvedParameters, Vec<ResolutionError>> {
    if snapshot.network() != network {
        // Nothing else is meaningful against the wrong network's state.
        return Err(vec![ResolutionError::NetworkMismatch {
            expected: network,
            actual: snapshot.network(),
        }]);
    }

    let mut params = ResolvedParameters::default();
    let mut errors = Vec::new();

    for reference in &entry.required_traits {
        match symbols::lookup_trait(network, &reference.key) {
            Some(identifier) => {
                params.insert(&reference.template_key, Value::String(identifier.to_string()));
            }
            None => errors.push(ResolutionError::UnknownTrait {
                key: reference.key.clone(),
                suggestion: symbols::closest_trait_key(network, &reference.key),
            }),
        }
    }

    for reference in &entry.required_addresses {
        match symbols::lookup_address(network, &reference.key) {
            Some(principal) => {
                params.insert(&reference.template_key, Value::String(principal.to_string()));
            }
            None => errors.push(ResolutionError::UnknownAddress {
                key: reference.key.clone(),
                suggestion: symbols::closest_address_key(network, &reference.key),
            }),
        }
    }

    for reference in &entry.required_contract_addresses {
        let producers = snapshot.live_producers(reference.category, reference.subcategory);
        match producers.as_slice() {
            [] => errors.push(ResolutionError::DependencyNotDeployed {
                category: reference.category,
                subcategory: reference.subcategory,
            }),
            [(_, record)] => {
                params.insert(
                    &reference.template_key,
                    Value::String(record.contract_address.clone()),
                );
            }
            many => errors.push(ResolutionError::AmbiguousProducer {
                category: reference.category,
                subcategory: reference.subcategory,
                producers: many.iter().map(|(key, _)| key.name.clone()).collect(),
            }),
        }
    }

    for reference in &entry.required_runtime_values {
        match runtime_values.get(&reference.template_key) {
            Some(value) => params.insert(&reference.template_key, value.clone()),
            None => errors.push(ResolutionError::MissingRuntimeValue {
                key: reference.template_key.clone(),
            }),
        }
    }

    if errors.is_empty() {
        Ok(params)
    } else {
        Err(errors)
    }
}
