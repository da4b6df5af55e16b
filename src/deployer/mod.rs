//! The external deploy collaborator boundary and the plan executor.
//!
//! Signing, broadcasting, nonce allocation, and confirmation polling live
//! outside this crate behind the async [`ContractDeployer`] trait: the
//! executor hands over rendered source and a contract name, awaits a
//! [`DeployReceipt`], and records the outcome. Timeouts and cancellation
//! belong to the collaborator, not to this core.
//!
//! [`execute_plan`] drives one planning request end to end, per template in
//! sequencer order: resolve against the current registry snapshot, render,
//! record the Generated entry, deploy through the collaborator, record the
//! Deployed entry. Each successful deployment immediately unlocks later
//! resolutions in the same run. A failed deploy does not abort the rest of
//! the plan by default; every failure is collected into the report rather
//! than silently retried.

use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::{Catalog, ContractCategory, ContractSubcategory, TemplateEntry};
use crate::core::ForgeError;
use crate::network::Network;
use crate::registry::{ContractRegistry, DeployedRecord, RegistryKey};
use crate::renderer::{TemplateRenderer, commitment_hash, fully_qualified};
use crate::resolver::{self, RuntimeValues};
use crate::sequencer;

/// Runtime keys the executor derives instead of the caller: a commitment
/// hash over the named pair's producer, computed from the deployer principal
/// before anything is broadcast.
const COMMITMENT_KEYS: &[(&str, ContractCategory, ContractSubcategory)] =
    &[("token_dex_commitment", ContractCategory::Token, ContractSubcategory::Dex)];

/// Everything the collaborator needs to broadcast one contract deploy.
#[derive(Debug, Clone)]
pub struct DeployRequest<'a> {
    /// Fully rendered contract source.
    pub source: &'a str,
    /// On-chain contract name.
    pub contract_name: &'a str,
    /// Clarity version to deploy with, if the template pins one.
    pub clarity_version: Option<u8>,
    /// Sender principal signing the deploy.
    pub sender: &'a str,
    /// Network to broadcast on.
    pub network: Network,
}

/// Outcome of one deploy attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReceipt {
    pub success: bool,
    /// Fully-qualified address the contract lives (or would live) at.
    pub contract_address: String,
    pub tx_id: Option<String>,
    pub error: Option<String>,
}

/// The async boundary to transaction signing and broadcast.
///
/// Implementations own account derivation, nonce management, fee selection,
/// and confirmation polling. Errors returned here are transport-level
/// failures; an on-chain rejection is a `success = false` receipt.
pub trait ContractDeployer {
    fn deploy(
        &self,
        request: DeployRequest<'_>,
    ) -> impl Future<Output = anyhow::Result<DeployReceipt>> + Send;
}

/// Dry-run collaborator: every deploy "succeeds" at the deterministic
/// address without touching a network. Used by `--dry-run` and tests.
#[derive(Debug, Clone, Default)]
pub struct NullDeployer;

impl ContractDeployer for NullDeployer {
    async fn deploy(&self, request: DeployRequest<'_>) -> anyhow::Result<DeployReceipt> {
        Ok(DeployReceipt {
            success: true,
            contract_address: fully_qualified(request.sender, request.contract_name),
            tx_id: None,
            error: None,
        })
    }
}

/// Options for one execution run.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    pub network: Network,
    /// Sender principal; also the deployer half of commitment hashes.
    pub sender: String,
    /// Caller-supplied runtime values, shared by every template in the run.
    pub runtime_values: RuntimeValues,
    /// Keep deploying independent templates after a failure (the default
    /// policy); `false` stops at the first failed deploy.
    pub continue_on_failure: bool,
}

/// One template that could not be resolved or deployed in this run.
#[derive(Debug)]
pub struct TemplateFailure {
    pub template: String,
    pub errors: Vec<ForgeError>,
}

/// Outcome of a full execution run.
#[derive(Debug, Default)]
pub struct PlanReport {
    /// (template name, receipt) per completed deploy attempt, in order.
    pub deployed: Vec<(String, DeployReceipt)>,
    /// Every template that failed resolution or deployment.
    pub failures: Vec<TemplateFailure>,
}

impl PlanReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.deployed.iter().all(|(_, r)| r.success)
    }
}

/// Derive commitment-hash runtime values this entry declares but the caller
/// did not supply. The hashed identifier is deterministic (sender + the
/// catalog's producer name for the pair), so it is computable before
/// deployment; the caller must deploy under that same identifier.
pub fn prepare_runtime_values(
    catalog: &Catalog,
    entry: &TemplateEntry,
    sender: &str,
    caller_values: &RuntimeValues,
) -> (RuntimeValues, Option<String>) {
    let mut values = caller_values.clone();
    let mut derived_hash = None;

    for requirement in &entry.required_runtime_values {
        if values.contains_key(&requirement.template_key) {
            continue;
        }
        let pair = COMMITMENT_KEYS
            .iter()
            .find(|(key, _, _)| *key == requirement.template_key);
        if let Some((_, category, subcategory)) = pair
            && let [producer] = catalog.producers(*category, *subcategory).as_slice()
        {
            let hash = commitment_hash(sender, &producer.name);
            values.insert(requirement.template_key.clone(), Value::String(hash.clone()));
            derived_hash = Some(hash);
        }
    }

    (values, derived_hash)
}

/// Execute one planning request end to end.
///
/// Returns `Err` only for request-fatal conditions: an unknown template, a
/// dependency cycle, a network mismatch, or a registry conflict. Per-template
/// failures land in the report and leave independent templates running.
pub async fn execute_plan<D: ContractDeployer>(
    catalog: &Catalog,
    registry: &mut ContractRegistry,
    renderer: &TemplateRenderer,
    deployer: &D,
    requested: &[String],
    options: &ExecuteOptions,
) -> Result<PlanReport, ForgeError> {
    if registry.network() != options.network {
        return Err(ForgeError::NetworkMismatch {
            expected: options.network,
            actual: registry.network(),
        });
    }

    let planned = sequencer::plan(requested, catalog)?;
    let mut report = PlanReport::default();

    for failure in &planned.failures {
        if let sequencer::PlanError::UnsatisfiableDependency { template, .. } = failure {
            warn!(template = %template, "cannot plan template");
            report.failures.push(TemplateFailure {
                template: template.clone(),
                errors: vec![failure.clone().into()],
            });
        }
    }
    if !report.failures.is_empty() && !options.continue_on_failure {
        return Ok(report);
    }

    for entry in planned.order {
        let key = RegistryKey::new(entry.category, entry.subcategory, entry.name.clone());
        registry.declare(key.clone());

        let (runtime_values, derived_hash) =
            prepare_runtime_values(catalog, entry, &options.sender, &options.runtime_values);

        let snapshot = registry.snapshot();
        let params = match resolver::resolve(entry, options.network, &snapshot, &runtime_values) {
            Ok(params) => params,
            Err(errors) => {
                warn!(template = %entry.name, count = errors.len(), "resolution failed");
                report.failures.push(TemplateFailure {
                    template: entry.name.clone(),
                    errors: errors
                        .into_iter()
                        .map(|e| e.into_forge(&entry.name, options.network))
                        .collect(),
                });
                continue;
            }
        };

        let source = match renderer.render(entry, &params) {
            Ok(source) => source,
            Err(err) => {
                report.failures.push(TemplateFailure {
                    template: entry.name.clone(),
                    errors: vec![err],
                });
                continue;
            }
        };

        registry.record_generated(key.clone(), source.clone(), derived_hash)?;

        let receipt = deployer
            .deploy(DeployRequest {
                source: &source,
                contract_name: &entry.name,
                clarity_version: entry.clarity_version,
                sender: &options.sender,
                network: options.network,
            })
            .await
            .unwrap_or_else(|e| DeployReceipt {
                success: false,
                contract_address: fully_qualified(&options.sender, &entry.name),
                tx_id: None,
                error: Some(e.to_string()),
            });

        registry.record_deployed(
            key,
            DeployedRecord {
                contract_address: receipt.contract_address.clone(),
                sender: options.sender.clone(),
                success: receipt.success,
                tx_id: receipt.tx_id.clone(),
            },
        )?;

        if receipt.success {
            info!(template = %entry.name, address = %receipt.contract_address, "deployed");
        } else {
            warn!(template = %entry.name, error = ?receipt.error, "deploy failed");
        }

        let failed = !receipt.success;
        report.deployed.push((entry.name.clone(), receipt));
        if failed && !options.continue_on_failure {
            break;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::aibtc;
    use std::collections::HashSet;

    /// Fails deploys for a fixed set of template names.
    struct FlakyDeployer {
        failing: HashSet<String>,
    }

    impl ContractDeployer for FlakyDeployer {
        async fn deploy(&self, request: DeployRequest<'_>) -> anyhow::Result<DeployReceipt> {
            if self.failing.contains(request.contract_name) {
                Ok(DeployReceipt {
                    success: false,
                    contract_address: fully_qualified(request.sender, request.contract_name),
                    tx_id: None,
                    error: Some("broadcast rejected".to_string()),
                })
            } else {
                NullDeployer.deploy(request).await
            }
        }
    }

    fn options() -> ExecuteOptions {
        let mut runtime_values = RuntimeValues::new();
        for (key, value) in [
            ("token_symbol", Value::String("AIBTC".to_string())),
            ("token_name", Value::String("aibtc token".to_string())),
            ("token_max_supply", Value::from(100_000_000u64)),
            ("token_uri", Value::String("https://aibtc.dev/token.json".to_string())),
            ("dao_charter_text", Value::String("do good".to_string())),
            ("dao_manifest", Value::String("manifest".to_string())),
            ("resource_name", Value::String("consulting".to_string())),
            ("stx_amount", Value::from(1_000_000u64)),
        ] {
            runtime_values.insert(key.to_string(), value);
        }
        ExecuteOptions {
            network: Network::Devnet,
            sender: crate::symbols::deployer(Network::Devnet).to_string(),
            runtime_values,
            continue_on_failure: true,
        }
    }

    fn all_names(catalog: &Catalog) -> Vec<String> {
        catalog.entries().iter().map(|e| e.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_full_suite_dry_run_deploys_everything() {
        let catalog = aibtc::catalog().unwrap();
        let mut registry = ContractRegistry::new(Network::Devnet);
        let renderer = TemplateRenderer::new("templates");
        let opts = options();

        let report = execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &NullDeployer,
            &all_names(&catalog),
            &opts,
        )
        .await
        .unwrap();

        assert!(report.is_success(), "failures: {:?}", report.failures);
        assert_eq!(report.deployed.len(), catalog.len());
        // Everything landed in the registry as live.
        for entry in catalog.entries() {
            let key = RegistryKey::new(entry.category, entry.subcategory, entry.name.clone());
            assert!(registry.get(&key).unwrap().is_live(), "{} not live", entry.name);
        }
    }

    #[tokio::test]
    async fn test_commitment_hash_injected_into_token_source() {
        let catalog = aibtc::catalog().unwrap();
        let mut registry = ContractRegistry::new(Network::Devnet);
        let renderer = TemplateRenderer::new("templates");
        let opts = options();

        execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &NullDeployer,
            &all_names(&catalog),
            &opts,
        )
        .await
        .unwrap();

        let token_key = RegistryKey::new(
            ContractCategory::Token,
            ContractSubcategory::Dao,
            "aibtc-token",
        );
        let entry = registry.get(&token_key).unwrap();
        let expected = commitment_hash(&opts.sender, "aibtc-token-dex");
        assert_eq!(entry.generated.as_ref().unwrap().hash.as_deref(), Some(expected.as_str()));
        assert!(entry.generated.as_ref().unwrap().source.contains(&expected));
    }

    #[tokio::test]
    async fn test_failed_producer_blocks_consumers_but_not_independents() {
        let catalog = aibtc::catalog().unwrap();
        let mut registry = ContractRegistry::new(Network::Devnet);
        let renderer = TemplateRenderer::new("templates");
        let opts = options();

        let deployer = FlakyDeployer {
            failing: ["aibtc-onchain-messaging".to_string()].into_iter().collect(),
        };
        let report = execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &deployer,
            &all_names(&catalog),
            &opts,
        )
        .await
        .unwrap();

        assert!(!report.is_success());
        // Messaging consumers fail resolution with DependencyNotDeployed...
        let failed: Vec<&str> =
            report.failures.iter().map(|f| f.template.as_str()).collect();
        assert!(failed.contains(&"aibtc-action-send-message"));
        // ...while templates independent of messaging still deploy.
        let deployed: Vec<&str> =
            report.deployed.iter().filter(|(_, r)| r.success).map(|(n, _)| n.as_str()).collect();
        assert!(deployed.contains(&"aibtc-treasury"));
        assert!(deployed.contains(&"aibtc-token"));
    }

    #[tokio::test]
    async fn test_unplannable_template_reported_but_rest_deploy() {
        let catalog = aibtc::catalog().unwrap();
        let mut registry = ContractRegistry::new(Network::Devnet);
        let renderer = TemplateRenderer::new("templates");
        let opts = options();

        // Withdraw needs the messaging producer, which exists in the catalog
        // but is not requested; base DAO and treasury deploy anyway.
        let report = execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &NullDeployer,
            &[
                "aibtc-base-dao".to_string(),
                "aibtc-treasury".to_string(),
                "aibtc-action-treasury-withdraw-stx".to_string(),
            ],
            &opts,
        )
        .await
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].template, "aibtc-action-treasury-withdraw-stx");
        assert!(matches!(
            report.failures[0].errors[0],
            ForgeError::UnsatisfiableDependency { .. }
        ));
        let deployed: Vec<&str> = report.deployed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(deployed, ["aibtc-base-dao", "aibtc-treasury"]);
    }

    #[tokio::test]
    async fn test_stop_on_failure_policy() {
        let catalog = aibtc::catalog().unwrap();
        let mut registry = ContractRegistry::new(Network::Devnet);
        let renderer = TemplateRenderer::new("templates");
        let mut opts = options();
        opts.continue_on_failure = false;

        let deployer = FlakyDeployer {
            failing: ["aibtc-base-dao".to_string()].into_iter().collect(),
        };
        let report = execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &deployer,
            &all_names(&catalog),
            &opts,
        )
        .await
        .unwrap();

        // Base DAO deploys first and fails; nothing else is attempted.
        assert_eq!(report.deployed.len(), 1);
        assert!(!report.deployed[0].1.success);
    }

    #[tokio::test]
    async fn test_network_mismatch_is_fatal() {
        let catalog = aibtc::catalog().unwrap();
        let mut registry = ContractRegistry::new(Network::Mainnet);
        let renderer = TemplateRenderer::new("templates");
        let opts = options(); // devnet

        let err = execute_plan(
            &catalog,
            &mut registry,
            &renderer,
            &NullDeployer,
            &all_names(&catalog),
            &opts,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ForgeError::NetworkMismatch { .. }));
    }
}
