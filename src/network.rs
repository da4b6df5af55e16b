//! Stacks network identifiers.
//!
//! Every symbol lookup, ledger, and deployment is scoped to one network.
//! Devnet and mocknet are distinct identifiers but share symbol tables,
//! since both run against a local chain with the standard dev principals.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::ForgeError;

/// A Stacks network a contract suite can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Mocknet,
}

impl Network {
    /// Every supported network, in display order.
    pub const ALL: [Network; 4] =
        [Network::Mainnet, Network::Testnet, Network::Devnet, Network::Mocknet];

    pub const fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Mocknet => "mocknet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "mocknet" => Ok(Network::Mocknet),
            _ => Err(ForgeError::InvalidNetwork {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for network in Network::ALL {
            assert_eq!(network.as_str().parse::<Network>().unwrap(), network);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("TESTNET".parse::<Network>().unwrap(), Network::Testnet);
    }

    #[test]
    fn rejects_unknown_network() {
        let err = "regtest".parse::<Network>().unwrap_err();
        assert!(matches!(err, ForgeError::InvalidNetwork { value } if value == "regtest"));
    }

    #[test]
    fn serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Network::Devnet).unwrap(), "\"devnet\"");
        let parsed: Network = serde_json::from_str("\"mocknet\"").unwrap();
        assert_eq!(parsed, Network::Mocknet);
    }
}
