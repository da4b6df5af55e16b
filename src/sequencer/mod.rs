//! Deployment sequencing: topologically ordering a requested set of
//! templates so every producer deploys before its consumers.
//!
//! [`plan`] orders exactly what it is asked to deploy and never pulls in
//! extras. Dependency edges are built only among the requested templates.
//! A requirement whose pair has no producer anywhere in the catalog adds no
//! edge: only the registry can say whether such a producer already exists,
//! so the template stays in the order and resolution decides. A requirement
//! whose producer is in the catalog but outside the requested set is a
//! [`PlanError::UnsatisfiableDependency`], fatal for that template only: it
//! drops out of the order while independent templates keep theirs. The
//! exception is requirements on foundational pairs (the base DAO), where the
//! producer is treated as possibly deployed in an earlier run. This is the
//! bootstrap escape hatch shared with the resolver's "already deployed"
//! rule.
//!
//! The ordering is a stable topological sort: ties break by each template's
//! optional `deployment_order` hint, then catalog declaration order, so the
//! same request against the same catalog always yields the same plan.

pub mod dependency_graph;

use thiserror::Error;
use tracing::debug;

use crate::catalog::{Catalog, ContractCategory, ContractSubcategory, TemplateEntry};
use crate::core::ForgeError;
use dependency_graph::DependencyGraph;

/// Pairs whose producer may live outside the current planning request.
const BOOTSTRAP_PAIRS: &[(ContractCategory, ContractSubcategory)] =
    &[(ContractCategory::Base, ContractSubcategory::Dao)];

/// Planning failure. [`PlanError::UnknownTemplate`] and [`PlanError::Cycle`]
/// are fatal for the whole request; [`PlanError::UnsatisfiableDependency`]
/// is reported per template through [`Plan::failures`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// A requested name does not exist in the catalog.
    #[error("template '{name}' not found in catalog")]
    UnknownTemplate { name: String },

    /// A requested template needs a producer that exists in the catalog but
    /// is neither requested nor covered by the bootstrap escape hatch.
    #[error("'{template}' requires a {category}/{subcategory} producer outside the requested set")]
    UnsatisfiableDependency {
        template: String,
        category: ContractCategory,
        subcategory: ContractSubcategory,
    },

    /// The requested templates form a cycle; no order exists.
    #[error("circular dependency among templates: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },
}

impl From<PlanError> for ForgeError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::UnknownTemplate { name } => ForgeError::TemplateNotFound { name },
            PlanError::UnsatisfiableDependency {
                template,
                category,
                subcategory,
            } => ForgeError::UnsatisfiableDependency {
                template,
                category: category.to_string(),
                subcategory: subcategory.to_string(),
            },
            PlanError::Cycle { cycle } => ForgeError::CircularDependency { cycle },
        }
    }
}

/// A computed deployment order plus the templates that could not be planned.
#[derive(Debug)]
pub struct Plan<'a> {
    /// Plannable requested templates in deploy order, producers before
    /// consumers.
    pub order: Vec<&'a TemplateEntry>,
    /// Per-template failures, each a
    /// [`PlanError::UnsatisfiableDependency`] naming one unsatisfied pair.
    /// The templates named here are excluded from `order`.
    pub failures: Vec<PlanError>,
}

fn is_bootstrap_pair(category: ContractCategory, subcategory: ContractSubcategory) -> bool {
    BOOTSTRAP_PAIRS.contains(&(category, subcategory))
}

/// Compute a deployment order for `requested` templates.
///
/// Duplicate names in the request collapse to one occurrence. The returned
/// order borrows from the catalog and lists every plannable requested
/// template exactly once; templates with an unsatisfiable requirement are
/// reported in [`Plan::failures`] instead, every unsatisfied pair named.
/// `Err` is reserved for request-fatal conditions: an unknown name or a
/// dependency cycle.
pub fn plan<'a>(requested: &[String], catalog: &'a Catalog) -> Result<Plan<'a>, PlanError> {
    let mut graph = DependencyGraph::new();
    let mut selected: Vec<&TemplateEntry> = Vec::with_capacity(requested.len());
    let mut seen = std::collections::HashSet::new();

    for name in requested {
        let entry = catalog.get(name).ok_or_else(|| PlanError::UnknownTemplate {
            name: name.clone(),
        })?;
        if !seen.insert(entry.name.as_str()) {
            continue;
        }
        let position = catalog.position(name).unwrap_or(usize::MAX);
        graph.ensure_node(&entry.name, (entry.deployment_order.unwrap_or(u32::MAX), position));
        selected.push(entry);
    }

    let mut failures = Vec::new();
    let mut unplannable = std::collections::HashSet::new();

    for entry in &selected {
        for reference in &entry.required_contract_addresses {
            let catalog_producers = catalog.producers(reference.category, reference.subcategory);
            if catalog_producers.is_empty() {
                // No producer anywhere in the catalog. The registry may
                // already hold one, so resolution decides, not planning.
                continue;
            }

            let requested_producers: Vec<&TemplateEntry> = catalog_producers
                .into_iter()
                .filter(|producer| selected.iter().any(|s| s.name == producer.name))
                .collect();

            if requested_producers.is_empty() {
                if is_bootstrap_pair(reference.category, reference.subcategory) {
                    // Treated as deployed in an earlier run; resolution will
                    // look it up in the registry snapshot.
                    continue;
                }
                unplannable.insert(entry.name.as_str());
                failures.push(PlanError::UnsatisfiableDependency {
                    template: entry.name.clone(),
                    category: reference.category,
                    subcategory: reference.subcategory,
                });
                continue;
            }

            // A well-formed catalog has one producer per pair; if several
            // were requested anyway, order behind all of them and let
            // resolution report the ambiguity.
            for producer in requested_producers {
                if producer.name != entry.name {
                    graph.add_dependency(&producer.name, &entry.name);
                }
            }
        }
    }

    let order = graph
        .stable_topo_order()
        .map_err(|cycle| PlanError::Cycle { cycle })?;
    debug!(
        requested = requested.len(),
        planned = order.len() - unplannable.len(),
        unplannable = unplannable.len(),
        "planned deployment order"
    );

    Ok(Plan {
        order: order
            .iter()
            .filter(|name| !unplannable.contains(name.as_str()))
            .filter_map(|name| catalog.get(name))
            .collect(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aibtc;
    use crate::catalog::{Catalog, ContractAddressReference, RuntimeValueReference};
    use crate::network::Network;
    use crate::registry::RegistrySnapshot;
    use crate::resolver::{self, ResolutionError, RuntimeValues};

    fn names(entries: &[&TemplateEntry]) -> Vec<String> {
        entries.iter().map(|e| e.name.clone()).collect()
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn bare_entry(name: &str, subcategory: ContractSubcategory) -> TemplateEntry {
        TemplateEntry {
            name: name.to_string(),
            friendly_name: name.to_string(),
            template_path: format!("{name}.clar"),
            category: ContractCategory::Extensions,
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
    fn test_unknown_name_rejected() {
        let catalog = aibtc::catalog().unwrap();
        let err = plan(&strings(&["no-such-template"]), &catalog).unwrap_err();
        assert_eq!(
            err,
            PlanError::UnknownTemplate {
                name: "no-such-template".to_string()
            }
        );
    }

    #[test]
    fn test_producers_before_consumers() {
        let catalog = aibtc::catalog().unwrap();
        let plan = plan(
            &strings(&[
                "aibtc-action-treasury-withdraw-stx",
                "aibtc-treasury",
                "aibtc-onchain-messaging",
            ]),
            &catalog,
        )
        .unwrap();
        assert!(plan.failures.is_empty());
        let order = names(&plan.order);

        let treasury = order.iter().position(|n| n == "aibtc-treasury").unwrap();
        let messaging = order.iter().position(|n| n == "aibtc-onchain-messaging").unwrap();
        let withdraw = order
            .iter()
            .position(|n| n == "aibtc-action-treasury-withdraw-stx")
            .unwrap();
        assert!(treasury < withdraw);
        assert!(messaging < withdraw);
    }

    #[test]
    fn test_base_dao_requirement_uses_bootstrap_hatch() {
        let catalog = aibtc::catalog().unwrap();
        // Treasury requires base/dao, which is not in the request; the plan
        // still succeeds because base/dao may be deployed in an earlier run.
        let plan = plan(&strings(&["aibtc-treasury"]), &catalog).unwrap();
        assert_eq!(names(&plan.order), ["aibtc-treasury"]);
        assert!(plan.failures.is_empty());
    }

    #[test]
    fn test_unrequested_catalog_producer_reported_per_template() {
        let catalog = aibtc::catalog().unwrap();
        // Withdraw requires extensions/treasury and extensions/messaging;
        // both producers exist in the catalog but neither is requested.
        let plan = plan(&strings(&["aibtc-action-treasury-withdraw-stx"]), &catalog).unwrap();
        assert!(plan.order.is_empty());
        assert_eq!(plan.failures.len(), 2);
        for failure in &plan.failures {
            assert!(matches!(
                failure,
                PlanError::UnsatisfiableDependency { template, .. }
                    if template == "aibtc-action-treasury-withdraw-stx"
            ));
        }
    }

    #[test]
    fn test_independent_templates_keep_their_order() {
        let catalog = aibtc::catalog().unwrap();
        // Withdraw is missing its requested messaging producer; treasury has
        // no such problem and still plans.
        let plan = plan(
            &strings(&["aibtc-action-treasury-withdraw-stx", "aibtc-treasury"]),
            &catalog,
        )
        .unwrap();
        assert_eq!(names(&plan.order), ["aibtc-treasury"]);
        assert_eq!(
            plan.failures,
            vec![PlanError::UnsatisfiableDependency {
                template: "aibtc-action-treasury-withdraw-stx".to_string(),
                category: ContractCategory::Extensions,
                subcategory: ContractSubcategory::Messaging,
            }]
        );
    }

    #[test]
    fn test_missing_catalog_producer_defers_to_resolution() {
        // A two-template catalog with no messaging producer at all: treasury
        // has no dependencies, withdraw needs extensions/treasury plus
        // extensions/messaging plus a runtime amount.
        let treasury = bare_entry("treasury", ContractSubcategory::Treasury);
        let mut withdraw = bare_entry("treasury-withdraw-stx", ContractSubcategory::Treasury);
        withdraw.category = ContractCategory::Actions;
        withdraw.required_contract_addresses.push(ContractAddressReference {
            template_key: "treasury_contract".to_string(),
            category: ContractCategory::Extensions,
            subcategory: ContractSubcategory::Treasury,
        });
        withdraw.required_contract_addresses.push(ContractAddressReference {
            template_key: "messaging_contract".to_string(),
            category: ContractCategory::Extensions,
            subcategory: ContractSubcategory::Messaging,
        });
        withdraw.required_runtime_values.push(RuntimeValueReference {
            template_key: "stx_amount".to_string(),
        });
        let catalog = Catalog::new(vec![treasury, withdraw]).unwrap();

        // Planning succeeds, treasury first; the missing producer is not a
        // planning concern because no catalog entry could ever provide it.
        let plan = plan(&strings(&["treasury-withdraw-stx", "treasury"]), &catalog).unwrap();
        assert_eq!(names(&plan.order), ["treasury", "treasury-withdraw-stx"]);
        assert!(plan.failures.is_empty());

        // Resolution against a registry with no deployed messaging entry is
        // where the failure surfaces.
        let mut runtime = RuntimeValues::new();
        runtime.insert("stx_amount".to_string(), serde_json::Value::from(1_000_000u64));
        let errors = resolver::resolve(
            plan.order[1],
            Network::Devnet,
            &RegistrySnapshot::empty(Network::Devnet),
            &runtime,
        )
        .unwrap_err();
        assert!(errors.contains(&ResolutionError::DependencyNotDeployed {
            category: ContractCategory::Extensions,
            subcategory: ContractSubcategory::Messaging,
        }));
    }

    #[test]
    fn test_full_suite_plan_is_deterministic() {
        let catalog = aibtc::catalog().unwrap();
        let all: Vec<String> = catalog.entries().iter().map(|e| e.name.clone()).collect();
        let first = names(&plan(&all, &catalog).unwrap().order);
        let second = names(&plan(&all, &catalog).unwrap().order);
        assert_eq!(first, second);
        assert_eq!(first.len(), catalog.len());
        assert_eq!(first[0], "aibtc-base-dao");
    }

    #[test]
    fn test_duplicate_request_collapses() {
        let catalog = aibtc::catalog().unwrap();
        let plan = plan(&strings(&["aibtc-treasury", "aibtc-treasury"]), &catalog).unwrap();
        assert_eq!(names(&plan.order), ["aibtc-treasury"]);
    }

    #[test]
    fn test_cycle_names_every_participant() {
        // Hand-built two-template cycle: a requires b's pair and vice versa.
        let mut a = bare_entry("cycle-a", ContractSubcategory::Treasury);
        let mut b = bare_entry("cycle-b", ContractSubcategory::Messaging);
        a.required_contract_addresses.push(ContractAddressReference {
            template_key: "dep".to_string(),
            category: ContractCategory::Extensions,
            subcategory: ContractSubcategory::Messaging,
        });
        b.required_contract_addresses.push(ContractAddressReference {
            template_key: "dep".to_string(),
            category: ContractCategory::Extensions,
            subcategory: ContractSubcategory::Treasury,
        });

        let catalog = Catalog::new(vec![a, b]).unwrap();
        let err = plan(&strings(&["cycle-a", "cycle-b"]), &catalog).unwrap_err();
        assert_eq!(
            err,
            PlanError::Cycle {
                cycle: vec!["cycle-a".to_string(), "cycle-b".to_string()]
            }
        );
    }
}
