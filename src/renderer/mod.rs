//! Template rendering: pure substitution of a resolved parameter set into a
//! contract template body.
//!
//! The [`TemplateRenderer`] wraps Tera in a sandboxed, one-off configuration:
//! no includes or extends, no file system access during rendering, no
//! dependency resolution. Its only I/O is reading the template body addressed
//! by the entry's `template_path` under the renderer's templates directory.
//!
//! Before substitution the body is scanned for `{{ marker }}` occurrences;
//! every marker must correspond to exactly one declared requirement of the
//! entry (undeclared markers are a render-time error, unused declared
//! requirements are allowed). Rendering is deterministic: identical body and
//! parameters produce byte-identical output.
//!
//! # Commitment hashes
//!
//! Paired templates (token/DEX) embed a hash of the counterpart's
//! fully-qualified identifier before either contract exists on chain.
//! [`commitment_hash`] computes it from the deployer principal and the chosen
//! contract name; the caller injects it as an ordinary runtime parameter and
//! must guarantee the identifier used here matches the one eventually
//! deployed. The renderer cannot detect a mismatch.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tera::{Context as TeraContext, Tera};
use tracing::debug;

use crate::catalog::TemplateEntry;
use crate::core::ForgeError;
use crate::resolver::ResolvedParameters;

/// Matches `{{ marker }}` substitution markers in a template body.
fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("marker regex is valid")
    })
}

/// The fully-qualified on-chain identifier for a contract: `deployer.name`.
///
/// Deterministic before deployment, which is what makes the commit-then-
/// verify pattern possible.
pub fn fully_qualified(deployer: &str, contract_name: &str) -> String {
    format!("{deployer}.{contract_name}")
}

/// SHA-256 over a not-yet-deployed contract's fully-qualified identifier,
/// lowercase hex.
pub fn commitment_hash(deployer: &str, contract_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fully_qualified(deployer, contract_name).as_bytes());
    hex::encode(hasher.finalize())
}

/// Renders catalog templates from a templates directory.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    templates_dir: PathBuf,
}

impl TemplateRenderer {
    /// Create a renderer rooted at a templates directory.
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Read an entry's template body from disk.
    pub fn load_body(&self, entry: &TemplateEntry) -> Result<String, ForgeError> {
        let path = self.templates_dir.join(&entry.template_path);
        if !path.is_file() {
            return Err(ForgeError::TemplateFileNotFound {
                path: entry.template_path.clone(),
            });
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    /// Render an entry's template body with a fully resolved parameter set.
    ///
    /// The caller guarantees `params` came from a successful resolution of
    /// this entry; rendering never runs against a partial parameter set.
    pub fn render(
        &self,
        entry: &TemplateEntry,
        params: &ResolvedParameters,
    ) -> Result<String, ForgeError> {
        let body = self.load_body(entry)?;
        self.render_body(entry, &body, params)
    }

    /// Render an in-memory body; split out so tests can exercise marker
    /// validation without touching disk.
    fn render_body(
        &self,
        entry: &TemplateEntry,
        body: &str,
        params: &ResolvedParameters,
    ) -> Result<String, ForgeError> {
        let declared: HashSet<&str> = entry.declared_template_keys().collect();
        for capture in marker_regex().captures_iter(body) {
            let marker = &capture[1];
            if !declared.contains(marker) {
                return Err(ForgeError::UndeclaredMarker {
                    template: entry.name.clone(),
                    marker: marker.to_string(),
                });
            }
        }

        let mut context = TeraContext::new();
        for (key, value) in params.iter() {
            context.insert(key, value);
        }

        debug!(template = %entry.name, params = params.len(), "rendering template");
        Tera::one_off(body, &context, false).map_err(|e| ForgeError::RenderFailed {
            template: entry.name.clone(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ContractCategory, ContractSubcategory, RuntimeValueReference};
    use serde_json::Value;

    fn entry_with_keys(keys: &[&str]) -> TemplateEntry {
        TemplateEntry {
            name: "test-template".to_string(),
            friendly_name: "Test".to_string(),
            template_path: "test.clar".to_string(),
            category: ContractCategory::Extensions,
            subcategory: ContractSubcategory::Treasury,
            deployment_order: None,
            clarity_version: None,
            required_traits: vec![],
            required_addresses: vec![],
            required_contract_addresses: vec![],
            required_runtime_values: keys
                .iter()
                .map(|k| RuntimeValueReference {
                    template_key: (*k).to_string(),
                })
                .collect(),
        }
    }

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new("templates")
    }

    #[test]
    fn test_substitutes_declared_markers() {
        let entry = entry_with_keys(&["stx_amount", "treasury_contract"]);
        let mut params = ResolvedParameters::default();
        params.insert("stx_amount", Value::from(1_000_000u64));
        params.insert("treasury_contract", Value::String("ST2X.aibtc-treasury".to_string()));

        let body = "(stx-transfer? u{{ stx_amount }} tx-sender '{{ treasury_contract }})";
        let rendered = renderer().render_body(&entry, body, &params).unwrap();
        assert_eq!(rendered, "(stx-transfer? u1000000 tx-sender 'ST2X.aibtc-treasury)");
    }

    #[test]
    fn test_undeclared_marker_is_an_error() {
        let entry = entry_with_keys(&["stx_amount"]);
        let mut params = ResolvedParameters::default();
        params.insert("stx_amount", Value::from(1u64));

        let body = "{{ stx_amount }} {{ mystery_marker }}";
        let err = renderer().render_body(&entry, body, &params).unwrap_err();
        match err {
            ForgeError::UndeclaredMarker { marker, .. } => assert_eq!(marker, "mystery_marker"),
            other => panic!("expected UndeclaredMarker, got {other}"),
        }
    }

    #[test]
    fn test_unused_declared_requirement_is_allowed() {
        let entry = entry_with_keys(&["used", "unused"]);
        let mut params = ResolvedParameters::default();
        params.insert("used", Value::String("x".to_string()));
        params.insert("unused", Value::String("y".to_string()));

        let rendered = renderer().render_body(&entry, "only {{ used }}", &params).unwrap();
        assert_eq!(rendered, "only x");
    }

    #[test]
    fn test_render_is_deterministic() {
        let entry = entry_with_keys(&["a", "b"]);
        let mut params = ResolvedParameters::default();
        params.insert("a", Value::String("1".to_string()));
        params.insert("b", Value::String("2".to_string()));

        let body = "{{ a }}-{{ b }}-{{ a }}";
        let first = renderer().render_body(&entry, body, &params).unwrap();
        let second = renderer().render_body(&entry, body, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_template_file() {
        let entry = entry_with_keys(&[]);
        let err = renderer().load_body(&entry).unwrap_err();
        assert!(matches!(err, ForgeError::TemplateFileNotFound { .. }));
    }

    #[test]
    fn test_commitment_hash_is_stable_and_identifier_sensitive() {
        let a = commitment_hash("ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F", "aibtc-token-dex");
        let b = commitment_hash("ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F", "aibtc-token-dex");
        let c = commitment_hash("ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F", "aibtc-token-dex-v2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }
}
