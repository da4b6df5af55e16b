//! Closed category/subcategory namespace for contract classification.
//!
//! The original string-keyed namespace is represented here as closed enums
//! validated at catalog-load time, so a bad pair is rejected before
//! resolution instead of silently matching zero producers.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::ForgeError;

/// Top-level classification of a contract template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ContractCategory {
    /// The base DAO contract everything else hangs off.
    Base,
    /// Action contracts invokable through action proposals.
    Actions,
    /// Swappable extension contracts.
    Extensions,
    /// One-shot proposal contracts.
    Proposals,
    /// The DAO token and its trading pair contracts.
    Token,
}

/// Second-level classification; which variants are valid depends on the
/// category, checked by [`ContractCategory::allows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractSubcategory {
    Dao,
    ActionProposals,
    CoreProposals,
    Charter,
    Messaging,
    Payments,
    Resources,
    TokenOwner,
    Treasury,
    Bootstrap,
    Dex,
    Pool,
}

impl ContractCategory {
    /// The subcategories valid under this category.
    pub const fn subcategories(self) -> &'static [ContractSubcategory] {
        use ContractSubcategory::*;
        match self {
            ContractCategory::Base => &[Dao],
            ContractCategory::Actions => &[Messaging, Resources, Treasury],
            ContractCategory::Extensions => &[
                ActionProposals,
                CoreProposals,
                Charter,
                Messaging,
                Payments,
                TokenOwner,
                Treasury,
            ],
            ContractCategory::Proposals => &[Bootstrap],
            ContractCategory::Token => &[Dao, Dex, Pool],
        }
    }

    /// Whether `subcategory` is valid under this category.
    pub fn allows(self, subcategory: ContractSubcategory) -> bool {
        self.subcategories().contains(&subcategory)
    }

    /// Validate a pair, returning the load-time error the catalog reports.
    pub fn validate_pair(self, subcategory: ContractSubcategory) -> Result<(), ForgeError> {
        if self.allows(subcategory) {
            Ok(())
        } else {
            Err(ForgeError::InvalidCategoryPair {
                category: self.to_string(),
                subcategory: subcategory.to_string(),
            })
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ContractCategory::Base => "base",
            ContractCategory::Actions => "actions",
            ContractCategory::Extensions => "extensions",
            ContractCategory::Proposals => "proposals",
            ContractCategory::Token => "token",
        }
    }
}

impl ContractSubcategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ContractSubcategory::Dao => "dao",
            ContractSubcategory::ActionProposals => "action-proposals",
            ContractSubcategory::CoreProposals => "core-proposals",
            ContractSubcategory::Charter => "charter",
            ContractSubcategory::Messaging => "messaging",
            ContractSubcategory::Payments => "payments",
            ContractSubcategory::Resources => "resources",
            ContractSubcategory::TokenOwner => "token-owner",
            ContractSubcategory::Treasury => "treasury",
            ContractSubcategory::Bootstrap => "bootstrap",
            ContractSubcategory::Dex => "dex",
            ContractSubcategory::Pool => "pool",
        }
    }
}

impl fmt::Display for ContractCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ContractSubcategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractCategory {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(ContractCategory::Base),
            "actions" => Ok(ContractCategory::Actions),
            "extensions" => Ok(ContractCategory::Extensions),
            "proposals" => Ok(ContractCategory::Proposals),
            "token" => Ok(ContractCategory::Token),
            other => Err(ForgeError::Other {
                message: format!("unknown contract category '{other}'"),
            }),
        }
    }
}

impl FromStr for ContractSubcategory {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dao" => Ok(ContractSubcategory::Dao),
            "action-proposals" => Ok(ContractSubcategory::ActionProposals),
            "core-proposals" => Ok(ContractSubcategory::CoreProposals),
            "charter" => Ok(ContractSubcategory::Charter),
            "messaging" => Ok(ContractSubcategory::Messaging),
            "payments" => Ok(ContractSubcategory::Payments),
            "resources" => Ok(ContractSubcategory::Resources),
            "token-owner" => Ok(ContractSubcategory::TokenOwner),
            "treasury" => Ok(ContractSubcategory::Treasury),
            "bootstrap" => Ok(ContractSubcategory::Bootstrap),
            "dex" => Ok(ContractSubcategory::Dex),
            "pool" => Ok(ContractSubcategory::Pool),
            other => Err(ForgeError::Other {
                message: format!("unknown contract subcategory '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pairs() {
        assert!(ContractCategory::Extensions.allows(ContractSubcategory::Treasury));
        assert!(ContractCategory::Base.allows(ContractSubcategory::Dao));
        assert!(ContractCategory::Token.allows(ContractSubcategory::Dex));
    }

    #[test]
    fn test_invalid_pair_rejected() {
        let err = ContractCategory::Base
            .validate_pair(ContractSubcategory::Dex)
            .unwrap_err();
        assert!(err.to_string().contains("'dex' is not valid for category 'base'"));
    }

    #[test]
    fn test_round_trip_strings() {
        for category in [
            ContractCategory::Base,
            ContractCategory::Actions,
            ContractCategory::Extensions,
            ContractCategory::Proposals,
            ContractCategory::Token,
        ] {
            let parsed: ContractCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
            for &sub in category.subcategories() {
                let parsed: ContractSubcategory = sub.as_str().parse().unwrap();
                assert_eq!(parsed, sub);
            }
        }
    }
}
