//! Contract registry state: an append-only ledger of contract lifecycle
//! events plus a folded current view.
//!
//! Each contract progresses through three stages, keyed by
//! (category, subcategory, name):
//!
//! 1. **Declared**: catalog fields only
//! 2. **Generated**: rendered source (and optional commitment hash) recorded
//! 3. **Deployed**: on-chain address, sender, success flag, optional txid
//!
//! Stage transitions are monotonic: a key recorded as deployed with
//! `success = true` never regresses. Failed deployments stay on the ledger
//! for audit and retry but are excluded from the view resolution consumes.
//! Re-recording an identical payload at the same key and stage is a silent
//! no-op; a differing payload raises [`ForgeError::RegistryConflict`] so two
//! planning runs cannot silently disagree about what is deployed where.
//!
//! The ledger persists as a TOML file (the crate's lockfile equivalent):
//! the serialized event log is the audit trail, and reloading it folds the
//! events back into the current view, seeding a later incremental run.
//!
//! Writes require single-writer discipline: the registry is owned mutably by
//! one planning run at a time. Read-only [`RegistrySnapshot`]s are cheap
//! clones and freely shareable across parallel resolutions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::catalog::{ContractCategory, ContractSubcategory};
use crate::core::ForgeError;
use crate::network::Network;

/// Current ledger file format version.
const LEDGER_VERSION: u32 = 1;

/// Identity of a registry entry: (category, subcategory, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryKey {
    pub category: ContractCategory,
    pub subcategory: ContractSubcategory,
    pub name: String,
}

impl RegistryKey {
    pub fn new(
        category: ContractCategory,
        subcategory: ContractSubcategory,
        name: impl Into<String>,
    ) -> Self {
        Self {
            category,
            subcategory,
            name: name.into(),
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.category, self.subcategory, self.name)
    }
}

/// Payload recorded when a contract's source has been rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    /// The fully rendered contract source.
    pub source: String,
    /// Commitment hash embedded in a paired contract, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

/// Payload recorded when a deploy attempt has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedRecord {
    /// Fully-qualified contract address (`principal.name`).
    pub contract_address: String,
    /// Principal that signed the deploy.
    pub sender: String,
    /// Whether the deployment succeeded. Failed deploys stay on the ledger
    /// but never satisfy a contract-address reference.
    pub success: bool,
    /// Transaction id, when the broadcast got far enough to have one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

/// Lifecycle position of a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStage {
    Declared,
    Generated,
    Deployed,
}

impl fmt::Display for ContractStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContractStage::Declared => "declared",
            ContractStage::Generated => "generated",
            ContractStage::Deployed => "deployed",
        };
        f.write_str(s)
    }
}

/// One append-only ledger event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub key: RegistryKey,
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: RegistryEventKind,
}

/// The stage-specific payload of a ledger event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "lowercase")]
pub enum RegistryEventKind {
    Declared,
    Generated(GeneratedRecord),
    Deployed(DeployedRecord),
}

/// Folded current state of one registry entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed: Option<DeployedRecord>,
}

impl RegistryEntry {
    pub fn stage(&self) -> ContractStage {
        if self.deployed.is_some() {
            ContractStage::Deployed
        } else if self.generated.is_some() {
            ContractStage::Generated
        } else {
            ContractStage::Declared
        }
    }

    /// Whether this entry can satisfy a contract-address reference.
    pub fn is_live(&self) -> bool {
        self.deployed.as_ref().is_some_and(|d| d.success)
    }
}

/// On-disk ledger shape.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    network: Network,
    #[serde(default)]
    events: Vec<RegistryEvent>,
}

/// The mutable contract registry for one network: event log + folded view.
#[derive(Debug, Clone)]
pub struct ContractRegistry {
    network: Network,
    events: Vec<RegistryEvent>,
    entries: BTreeMap<RegistryKey, RegistryEntry>,
}

impl ContractRegistry {
    /// Create an empty registry scoped to one network.
    pub fn new(network: Network) -> Self {
        Self {
            network,
            events: Vec::new(),
            entries: BTreeMap::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// The full event log, oldest first.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Record that a template has been selected for this deployment.
    /// Idempotent; declaring an existing key changes nothing.
    pub fn declare(&mut self, key: RegistryKey) {
        if self.fold_declared(&key) {
            self.push_event(key, RegistryEventKind::Declared);
        }
    }

    /// Record rendered source for a key, moving it to the Generated stage.
    ///
    /// Re-recording the identical payload is a no-op. A differing payload is
    /// accepted while no successful deploy exists for the key (the entry is
    /// re-renderable, possibly with a fresh commitment hash); once a
    /// `success = true` deploy is on the ledger, a differing payload is a
    /// [`ForgeError::RegistryConflict`].
    pub fn record_generated(
        &mut self,
        key: RegistryKey,
        source: impl Into<String>,
        hash: Option<String>,
    ) -> Result<(), ForgeError> {
        let record = GeneratedRecord {
            source: source.into(),
            hash,
        };
        if self.fold_generated(&key, &record)? {
            self.push_event(key, RegistryEventKind::Generated(record));
        }
        Ok(())
    }

    /// Record a deploy attempt for a key, moving it to the Deployed stage.
    ///
    /// Identical re-records are silently idempotent and add no log entry. A
    /// failed record may be superseded by a later successful one for the
    /// same key (retry is progress, not regression); any other divergence is
    /// a [`ForgeError::RegistryConflict`].
    pub fn record_deployed(
        &mut self,
        key: RegistryKey,
        record: DeployedRecord,
    ) -> Result<(), ForgeError> {
        if self.fold_deployed(&key, &record)? {
            self.push_event(key, RegistryEventKind::Deployed(record));
        }
        Ok(())
    }

    /// Fold a declaration into the view; `true` when the view changed and a
    /// log entry belongs with it.
    fn fold_declared(&mut self, key: &RegistryKey) -> bool {
        if self.entries.contains_key(key) {
            return false;
        }
        self.entries.insert(key.clone(), RegistryEntry::default());
        true
    }

    /// Fold a generated record into the view, enforcing the conflict rules;
    /// `true` when the view changed and a log entry belongs with it.
    fn fold_generated(
        &mut self,
        key: &RegistryKey,
        record: &GeneratedRecord,
    ) -> Result<bool, ForgeError> {
        let entry = self.entries.entry(key.clone()).or_default();

        if entry.generated.as_ref() == Some(record) {
            return Ok(false);
        }
        if entry.is_live() {
            return Err(ForgeError::RegistryConflict {
                key: key.to_string(),
                reason: "generated payload differs from the source already deployed successfully"
                    .to_string(),
            });
        }

        entry.generated = Some(record.clone());
        Ok(true)
    }

    /// Fold a deploy record into the view, enforcing the conflict rules;
    /// `true` when the view changed and a log entry belongs with it.
    fn fold_deployed(
        &mut self,
        key: &RegistryKey,
        record: &DeployedRecord,
    ) -> Result<bool, ForgeError> {
        let entry = self.entries.entry(key.clone()).or_default();

        if let Some(existing) = &entry.deployed {
            if existing == record {
                return Ok(false);
            }
            let supersedes_failure = !existing.success && record.success;
            if !supersedes_failure {
                return Err(ForgeError::RegistryConflict {
                    key: key.to_string(),
                    reason: format!(
                        "deployed record differs: have {} (success={}), got {} (success={})",
                        existing.contract_address,
                        existing.success,
                        record.contract_address,
                        record.success
                    ),
                });
            }
        }

        entry.deployed = Some(record.clone());
        Ok(true)
    }

    fn push_event(&mut self, key: RegistryKey, kind: RegistryEventKind) {
        self.events.push(RegistryEvent {
            key,
            recorded_at: Utc::now(),
            kind,
        });
    }

    /// Current folded state for a key.
    pub fn get(&self, key: &RegistryKey) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    /// An immutable snapshot of the current view for resolution.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            network: self.network,
            entries: self.entries.clone(),
        }
    }

    /// Persist the ledger (event log) to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ForgeError> {
        let file = LedgerFile {
            version: LEDGER_VERSION,
            network: self.network,
            events: self.events.clone(),
        };
        let content = toml::to_string_pretty(&file)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a ledger file and fold its events back into the current view.
    ///
    /// Replay uses the same conflict rules as live recording, so a ledger
    /// edited into an inconsistent state is rejected here rather than
    /// producing a corrupt view. Events are kept as persisted: `recorded_at`
    /// stamps survive the round trip, so the audit trail never loses its
    /// original timestamps.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let content = std::fs::read_to_string(path)?;
        let file: LedgerFile =
            toml::from_str(&content).map_err(|e| ForgeError::RegistryParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;
        if file.version != LEDGER_VERSION {
            return Err(ForgeError::RegistryParseError {
                file: path.display().to_string(),
                reason: format!("unsupported ledger version {}", file.version),
            });
        }

        let mut registry = Self::new(file.network);
        for event in file.events {
            let changed = match &event.kind {
                RegistryEventKind::Declared => registry.fold_declared(&event.key),
                RegistryEventKind::Generated(record) => {
                    registry.fold_generated(&event.key, record)?
                }
                RegistryEventKind::Deployed(record) => {
                    registry.fold_deployed(&event.key, record)?
                }
            };
            if changed {
                registry.events.push(event);
            }
        }
        Ok(registry)
    }
}

/// Read-only, network-tagged view of the registry at one point in time.
///
/// This is what the resolver consumes; it is freely shareable across
/// parallel resolutions against a fixed deployment state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    network: Network,
    entries: BTreeMap<RegistryKey, RegistryEntry>,
}

impl RegistrySnapshot {
    /// An empty snapshot for a network (nothing deployed yet).
    pub fn empty(network: Network) -> Self {
        Self {
            network,
            entries: BTreeMap::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn get(&self, key: &RegistryKey) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    /// Every successfully deployed producer for a (category, subcategory)
    /// pair, in key order.
    pub fn live_producers(
        &self,
        category: ContractCategory,
        subcategory: ContractSubcategory,
    ) -> Vec<(&RegistryKey, &DeployedRecord)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.category == category && key.subcategory == subcategory)
            .filter_map(|(key, entry)| {
                entry.deployed.as_ref().filter(|d| d.success).map(|d| (key, d))
            })
            .collect()
    }

    /// Serializable audit rows: key -> (stage, address, success).
    pub fn audit_rows(&self) -> Vec<AuditRow> {
        self.entries
            .iter()
            .map(|(key, entry)| AuditRow {
                key: key.clone(),
                stage: entry.stage(),
                address: entry.deployed.as_ref().map(|d| d.contract_address.clone()),
                success: entry.deployed.as_ref().map(|d| d.success),
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegistryKey, &RegistryEntry)> {
        self.entries.iter()
    }
}

/// One row of the serializable registry audit table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRow {
    pub key: RegistryKey,
    pub stage: ContractStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}
