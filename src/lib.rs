//! daoforge - template-driven Stacks contract generation and deployment
//! ordering.
//!
//! daoforge turns a catalog of Clarity contract templates into a fully
//! rendered, deployment-ordered DAO suite. Templates declare what they need
//! (trait identifiers, known addresses, already-deployed contracts, and
//! caller-supplied runtime values); the engine resolves those declarations
//! per network, renders the sources, sequences producers before consumers,
//! and records every lifecycle step in an append-only ledger.
//!
//! # Architecture Overview
//!
//! The pipeline runs in stages, each backed by one module:
//! - The catalog declares templates with their categories and requirements
//! - The sequencer computes a deterministic producer-first deployment order
//! - The resolver checks every declared requirement against the network's
//!   symbol tables, the registry snapshot, and caller-supplied values,
//!   collecting all failures instead of stopping at the first
//! - The renderer substitutes resolved parameters into the template body
//!   and refuses markers the catalog never declared
//! - The registry folds `declared -> generated -> deployed` events into the
//!   current state of each contract and persists them as a TOML ledger
//! - The deployer drives the whole pipeline, handing rendered sources to an
//!   async broadcast boundary
//!
//! # Core Modules
//!
//! ## Pipeline
//! - [`catalog`] - Template catalog, categories, and the built-in aibtc suite
//! - [`sequencer`] - Dependency graph and deterministic deployment ordering
//! - [`resolver`] - Four-pass, collect-everything requirement resolution
//! - [`renderer`] - Tera-backed rendering with undeclared-marker detection
//! - [`registry`] - Append-only lifecycle ledger and point-in-time snapshots
//! - [`deployer`] - Plan executor and the [`deployer::ContractDeployer`] boundary
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface (`plan`, `generate`, `list`, `validate`)
//! - [`core`] - Error types and user-facing error presentation
//! - [`network`] - Stacks network identifiers
//! - [`symbols`] - Per-network trait and address symbol tables
//!
//! # Example
//!
//! ```no_run
//! use daoforge::catalog::aibtc;
//! use daoforge::network::Network;
//! use daoforge::sequencer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalog = aibtc::catalog()?;
//! let requested: Vec<String> =
//!     catalog.entries().iter().map(|e| e.name.clone()).collect();
//! let plan = sequencer::plan(&requested, &catalog)
//!     .map_err(daoforge::core::ForgeError::from)?;
//! for entry in plan.order {
//!     println!("{} ({}/{})", entry.name, entry.category, entry.subcategory);
//! }
//! # let _ = Network::Devnet;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod cli;
pub mod core;
pub mod deployer;
pub mod network;
pub mod registry;
pub mod renderer;
pub mod resolver;
pub mod sequencer;
pub mod symbols;
