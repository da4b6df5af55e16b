//! Error handling for daoforge.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`ForgeError`]) for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Symbol tables**: [`ForgeError::UnknownTrait`], [`ForgeError::UnknownAddress`].
//!   A template names a symbolic key that no per-network table defines; always
//!   fatal (miswired template or missing network entry).
//! - **Dependency graph**: [`ForgeError::DependencyNotDeployed`],
//!   [`ForgeError::AmbiguousProducer`], [`ForgeError::UnsatisfiableDependency`].
//!   Fatal for the affected template only; independent templates may proceed.
//! - **Planning**: [`ForgeError::CircularDependency`] is fatal for the whole
//!   planning request, no partial order exists.
//! - **Caller input**: [`ForgeError::MissingRuntimeValue`], [`ForgeError::InvalidNetwork`].
//! - **Registry integrity**: [`ForgeError::RegistryConflict`] is always fatal,
//!   requires manual reconciliation of the ledger.
//! - **Catalog loading**: [`ForgeError::DuplicateTemplate`],
//!   [`ForgeError::InvalidCategoryPair`], [`ForgeError::CatalogParseError`].
//! - **Rendering**: [`ForgeError::UndeclaredMarker`], [`ForgeError::RenderFailed`],
//!   [`ForgeError::TemplateFileNotFound`].
//!
//! Use [`user_friendly_error`] to convert any error into a colored report with
//! contextual suggestions before exiting the CLI.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::network::Network;

/// The main error type for daoforge operations.
///
/// Each variant represents a specific failure mode and carries the context
/// needed to report it without re-deriving state: template names, symbolic
/// keys, registry keys, category pairs. Component-level error enums
/// ([`crate::resolver::ResolutionError`], [`crate::sequencer::PlanError`])
/// convert into these variants at the API boundary.
#[derive(Error, Debug)]
pub enum ForgeError {
    /// A template references a trait key absent from the per-network
    /// Known Traits table.
    #[error("unknown trait reference '{key}' for {network}")]
    UnknownTrait {
        /// The symbolic trait key that failed to resolve
        key: String,
        /// The network whose table was consulted
        network: Network,
        /// Closest known key, if any is similar enough to suggest
        suggestion: Option<String>,
    },

    /// A template references an address key absent from the per-network
    /// Known Addresses table.
    #[error("unknown address reference '{key}' for {network}")]
    UnknownAddress {
        /// The symbolic address key that failed to resolve
        key: String,
        /// The network whose table was consulted
        network: Network,
        /// Closest known key, if any is similar enough to suggest
        suggestion: Option<String>,
    },

    /// A contract-address reference found no successfully deployed producer
    /// for its (category, subcategory) pair.
    #[error("no deployed contract satisfies {category}/{subcategory} required by '{template}'")]
    DependencyNotDeployed {
        /// The template whose requirement failed
        template: String,
        /// Required producer category
        category: String,
        /// Required producer subcategory
        subcategory: String,
    },

    /// More than one successfully deployed contract matches a
    /// (category, subcategory) pair; the catalog must guarantee at most one
    /// live producer at a time.
    #[error(
        "ambiguous producer for {category}/{subcategory} required by '{template}': {}",
        producers.join(", ")
    )]
    AmbiguousProducer {
        /// The template whose requirement was ambiguous
        template: String,
        /// Required producer category
        category: String,
        /// Required producer subcategory
        subcategory: String,
        /// Names of every matching deployed contract
        producers: Vec<String>,
    },

    /// A requested template requires a producer that is neither in the
    /// requested set nor covered by the bootstrap escape hatch.
    #[error(
        "'{template}' requires a {category}/{subcategory} producer outside the requested set"
    )]
    UnsatisfiableDependency {
        /// The template whose requirement cannot be satisfied by this plan
        template: String,
        /// Required producer category
        category: String,
        /// Required producer subcategory
        subcategory: String,
    },

    /// The requested templates form a dependency cycle; no deployment order
    /// exists. Every participating template is named.
    #[error("circular dependency among templates: {}", cycle.join(" -> "))]
    CircularDependency {
        /// Every template on a cycle, in catalog order
        cycle: Vec<String>,
    },

    /// A declared runtime value was not supplied by the caller.
    #[error("missing runtime value '{key}' for template '{template}'")]
    MissingRuntimeValue {
        /// The template declaring the requirement
        template: String,
        /// The runtime parameter key the caller did not supply
        key: String,
    },

    /// A re-record at the same registry key and stage carried a different
    /// payload than the one already on the ledger.
    #[error("registry conflict at {key}: {reason}")]
    RegistryConflict {
        /// The (category/subcategory/name) key in conflict
        key: String,
        /// What diverged between the recorded and attempted payloads
        reason: String,
    },

    /// Two catalog entries share a `name`; names are unique across the whole
    /// catalog and duplicates are rejected at load time.
    #[error("duplicate template name '{name}' in catalog")]
    DuplicateTemplate {
        /// The duplicated template name
        name: String,
    },

    /// A catalog entry pairs a subcategory with a category it does not
    /// belong to; rejected at load time rather than silently matching
    /// nothing during resolution.
    #[error("subcategory '{subcategory}' is not valid for category '{category}'")]
    InvalidCategoryPair {
        /// The declared category
        category: String,
        /// The subcategory that does not belong to it
        subcategory: String,
    },

    /// A requested template name does not exist in the catalog.
    #[error("template '{name}' not found in catalog")]
    TemplateNotFound {
        /// The unknown template name
        name: String,
    },

    /// A template body file is missing from the templates directory.
    #[error("template file '{path}' not found")]
    TemplateFileNotFound {
        /// Path relative to the templates directory
        path: String,
    },

    /// A template body contains a substitution marker with no matching
    /// declared requirement. Unused declared requirements are allowed; the
    /// reverse is not.
    #[error("template '{template}' contains undeclared marker '{marker}'")]
    UndeclaredMarker {
        /// The template being rendered
        template: String,
        /// The marker with no declared requirement
        marker: String,
    },

    /// Template substitution itself failed (syntax error in the body).
    #[error("failed to render template '{template}': {reason}")]
    RenderFailed {
        /// The template being rendered
        template: String,
        /// The underlying engine error
        reason: String,
    },

    /// A resolution mixed a snapshot from one network with a lookup against
    /// another.
    #[error("network mismatch: resolving for {expected} against a {actual} snapshot")]
    NetworkMismatch {
        /// The network the caller asked to resolve for
        expected: Network,
        /// The network the registry snapshot was taken on
        actual: Network,
    },

    /// Catalog file could not be parsed.
    #[error("invalid catalog file {file}: {reason}")]
    CatalogParseError {
        /// Path to the catalog file
        file: String,
        /// Parse failure detail
        reason: String,
    },

    /// Registry ledger file could not be parsed.
    #[error("invalid registry ledger {file}: {reason}")]
    RegistryParseError {
        /// Path to the ledger file
        file: String,
        /// Parse failure detail
        reason: String,
    },

    /// A string did not name a known network.
    #[error("invalid network '{value}' (expected mainnet, testnet, devnet, or mocknet)")]
    InvalidNetwork {
        /// The rejected input
        value: String,
    },

    /// IO error wrapper from [`std::io::Error`].
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error wrapper from [`toml::de::Error`].
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error wrapper from [`toml::ser::Error`].
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// Generic error for cases that don't fit other variants.
    #[error("{message}")]
    Other {
        /// Description of the error
        message: String,
    },
}

/// Error wrapper that adds user-friendly presentation to any error.
///
/// When displayed, the context shows:
/// 1. **error**: the main message in red
/// 2. **details**: additional context in yellow (optional)
/// 3. **suggestion**: actionable resolution steps in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a basic context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add an actionable suggestion, shown in green.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add explanatory details, shown in yellow.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`] with suggestions.
///
/// Recognizes [`ForgeError`] variants and attaches tailored guidance; other
/// errors pass through with generic formatting.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let (suggestion, details) = match error.downcast_ref::<ForgeError>() {
        Some(ForgeError::UnknownTrait {
            suggestion: Some(closest),
            ..
        })
        | Some(ForgeError::UnknownAddress {
            suggestion: Some(closest),
            ..
        }) => (
            Some(format!("did you mean '{closest}'?")),
            Some("symbol tables are static per network; check the template's declared references".to_string()),
        ),
        Some(ForgeError::UnknownTrait { .. }) => (
            Some("check the template's required_traits against the known trait table for this network".to_string()),
            None,
        ),
        Some(ForgeError::UnknownAddress { .. }) => (
            Some("check the template's required_addresses against the known address table for this network".to_string()),
            None,
        ),
        Some(ForgeError::DependencyNotDeployed {
            category,
            subcategory,
            ..
        }) => (
            Some(format!(
                "deploy a {category}/{subcategory} contract first, or seed the registry ledger with its address"
            )),
            Some("only entries recorded as deployed with success=true satisfy contract-address references".to_string()),
        ),
        Some(ForgeError::AmbiguousProducer { .. }) => (
            Some("reconcile the registry ledger so at most one live producer exists per category/subcategory".to_string()),
            None,
        ),
        Some(ForgeError::UnsatisfiableDependency { .. }) => (
            Some("add the producer template to the requested set; the planner never pulls in extras".to_string()),
            None,
        ),
        Some(ForgeError::CircularDependency { .. }) => (
            Some("break the cycle by removing one of the contract-address references".to_string()),
            Some("no deployment order exists for a cyclic request".to_string()),
        ),
        Some(ForgeError::MissingRuntimeValue { key, .. }) => (
            Some(format!("supply the value with --runtime {key}=<value>")),
            None,
        ),
        Some(ForgeError::RegistryConflict { .. }) => (
            Some("two planning runs disagree about what is deployed where; reconcile the ledger manually".to_string()),
            None,
        ),
        Some(ForgeError::DuplicateTemplate { .. }) => (
            Some("template names are unique across the whole catalog; rename or remove one entry".to_string()),
            None,
        ),
        Some(ForgeError::TemplateNotFound { .. }) => (
            Some("run 'daoforge list' to see the catalog's template names".to_string()),
            None,
        ),
        Some(ForgeError::UndeclaredMarker { marker, .. }) => (
            Some(format!(
                "declare a requirement with template key '{marker}' or remove the marker from the body"
            )),
            Some("every marker in a template body must match exactly one declared requirement".to_string()),
        ),
        Some(ForgeError::CatalogParseError { .. }) => (
            Some("check the catalog TOML syntax; run 'daoforge validate' after fixing".to_string()),
            None,
        ),
        _ => (None, None),
    };

    ErrorContext {
        error,
        suggestion,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_variants() {
        let err = ForgeError::DependencyNotDeployed {
            template: "treasury-withdraw-stx".to_string(),
            category: "extensions".to_string(),
            subcategory: "messaging".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no deployed contract satisfies extensions/messaging required by 'treasury-withdraw-stx'"
        );

        let err = ForgeError::CircularDependency {
            cycle: vec!["a".to_string(), "b".to_string()],
        };
        assert!(err.to_string().contains("a -> b"));
    }

    #[test]
    fn test_error_context_builder() {
        let ctx = ErrorContext::new(ForgeError::TemplateNotFound {
            name: "ghost".to_string(),
        })
        .with_suggestion("check the name")
        .with_details("catalog has no such entry");

        let rendered = ctx.to_string();
        assert!(rendered.contains("template 'ghost' not found"));
        assert!(rendered.contains("Suggestion: check the name"));
        assert!(rendered.contains("Details: catalog has no such entry"));
    }

    #[test]
    fn test_user_friendly_error_attaches_suggestion() {
        let err = anyhow::Error::from(ForgeError::MissingRuntimeValue {
            template: "treasury-withdraw-stx".to_string(),
            key: "stx_amount".to_string(),
        });
        let ctx = user_friendly_error(err);
        assert_eq!(ctx.suggestion.as_deref(), Some("supply the value with --runtime stx_amount=<value>"));
    }

    #[test]
    fn test_user_friendly_error_uses_closest_key() {
        let err = anyhow::Error::from(ForgeError::UnknownTrait {
            key: "dao-traits.extention".to_string(),
            network: Network::Testnet,
            suggestion: Some("dao-traits.extension".to_string()),
        });
        let ctx = user_friendly_error(err);
        assert_eq!(ctx.suggestion.as_deref(), Some("did you mean 'dao-traits.extension'?"));
    }
}
