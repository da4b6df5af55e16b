//! Static per-network symbol tables.
//!
//! Two read-only mappings back every symbolic reference a template can
//! declare: known traits (symbolic key -> fully-qualified trait identifier)
//! and known addresses (symbolic key -> principal). Both are fixed at compile
//! time and scoped by [`Network`]; devnet and mocknet share one table since a
//! local Clarinet devnet uses the mocknet deployer keys.
//!
//! Lookups are exact. When a key misses, [`closest_trait_key`] and
//! [`closest_address_key`] offer the nearest known key (Levenshtein distance
//! within half the key's length) for "did you mean" diagnostics.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use strsim::levenshtein;

use crate::network::Network;

/// Maximum Levenshtein distance, as a percentage of the target key length,
/// for a key to be offered as a suggestion.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

const MAINNET_DEPLOYER: &str = "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46";
const TESTNET_DEPLOYER: &str = "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F";
const DEVNET_DEPLOYER: &str = "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM";

const MAINNET_TRAITS: &[(&str, &str)] = &[
    ("DAO_BASE", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.base-dao"),
    ("DAO_PROPOSAL", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.proposal"),
    ("DAO_EXTENSION", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.extension"),
    ("DAO_ACTION", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.action"),
    ("DAO_TREASURY", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.treasury"),
    ("DAO_MESSAGING", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.messaging"),
    ("DAO_INVOICES", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.invoices"),
    ("DAO_RESOURCES", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.resources"),
    ("DAO_CHARTER", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.charter"),
    ("DAO_TOKEN", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.token"),
    ("DAO_TOKEN_DEX", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.token-dex"),
    ("DAO_TOKEN_OWNER", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.token-owner"),
    ("SIP10", "SP3FBR2AGK5H9QBDH3EEN6DF8EK8JY7RX8QJ5SVTE.sip-010-trait-ft-standard.sip-010-trait"),
    ("SIP09", "SP2PABAF9FTAJYNFZH93XENAJ8FVY99RRM50D2JG9.nft-trait.nft-trait"),
    ("POOL", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.aibtc-dao-traits-v3.bitflow-pool"),
];

const TESTNET_TRAITS: &[(&str, &str)] = &[
    ("DAO_BASE", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.base-dao"),
    ("DAO_PROPOSAL", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.proposal"),
    ("DAO_EXTENSION", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.extension"),
    ("DAO_ACTION", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.action"),
    ("DAO_TREASURY", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.treasury"),
    ("DAO_MESSAGING", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.messaging"),
    ("DAO_INVOICES", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.invoices"),
    ("DAO_RESOURCES", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.resources"),
    ("DAO_CHARTER", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.charter"),
    ("DAO_TOKEN", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.token"),
    ("DAO_TOKEN_DEX", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.token-dex"),
    ("DAO_TOKEN_OWNER", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.token-owner"),
    ("SIP10", "ST1NXBK3K5YYMD6FD41MVNP3JS1GABZ8TRVX023PT.sip-010-trait-ft-standard.sip-010-trait"),
    ("SIP09", "ST2PABAF9FTAJYNFZH93XENAJ8FVY99RRM4MNBGEW.nft-trait.nft-trait"),
    ("POOL", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.aibtc-dao-traits-v3.bitflow-pool"),
];

const DEVNET_TRAITS: &[(&str, &str)] = &[
    ("DAO_BASE", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.base-dao"),
    ("DAO_PROPOSAL", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.proposal"),
    ("DAO_EXTENSION", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.extension"),
    ("DAO_ACTION", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.action"),
    ("DAO_TREASURY", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.treasury"),
    ("DAO_MESSAGING", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.messaging"),
    ("DAO_INVOICES", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.invoices"),
    ("DAO_RESOURCES", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.resources"),
    ("DAO_CHARTER", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.charter"),
    ("DAO_TOKEN", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.token"),
    ("DAO_TOKEN_DEX", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.token-dex"),
    ("DAO_TOKEN_OWNER", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.token-owner"),
    ("SIP10", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.sip-010-trait-ft-standard.sip-010-trait"),
    ("SIP09", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.nft-trait.nft-trait"),
    ("POOL", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.aibtc-dao-traits-v3.bitflow-pool"),
];

const MAINNET_ADDRESSES: &[(&str, &str)] = &[
    ("DEPLOYER", MAINNET_DEPLOYER),
    ("BURN", "SP000000000000000000002Q6VF78"),
    ("POX", "SP000000000000000000002Q6VF78.pox-4"),
    ("BITFLOW_CORE", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.xyk-core-v-1-2"),
    ("BITFLOW_STX_TOKEN", "SP2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8JMVA46.token-stx-v-1-2"),
    ("BITFLOW_FEE", "SP31C60QVZKZ9CMMZX73TQ3F0ZB1HZ5A6X9YYVGHS"),
];

const TESTNET_ADDRESSES: &[(&str, &str)] = &[
    ("DEPLOYER", TESTNET_DEPLOYER),
    ("BURN", "ST000000000000000000002AMW42H"),
    ("POX", "ST000000000000000000002AMW42H.pox-4"),
    ("BITFLOW_CORE", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.xyk-core-v-1-2"),
    ("BITFLOW_STX_TOKEN", "ST2XCME6ED8RERGR9R7YDZW7CA6G3F113Y8HQ2C4F.token-stx-v-1-2"),
    ("BITFLOW_FEE", "ST31C60QVZKZ9CMMZX73TQ3F0ZB1HZ5A6X8RKVRYG"),
];

const DEVNET_ADDRESSES: &[(&str, &str)] = &[
    ("DEPLOYER", DEVNET_DEPLOYER),
    ("BURN", "ST000000000000000000002AMW42H"),
    ("POX", "ST000000000000000000002AMW42H.pox-4"),
    ("BITFLOW_CORE", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.xyk-core-v-1-2"),
    ("BITFLOW_STX_TOKEN", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM.token-stx-v-1-2"),
    ("BITFLOW_FEE", "ST1PQHQKV0RJXQFY1DGX8MNSNYVE3VGZJSRTPGZGM"),
];

fn table_for(
    cell: &'static OnceLock<BTreeMap<&'static str, &'static str>>,
    pairs: &'static [(&'static str, &'static str)],
) -> &'static BTreeMap<&'static str, &'static str> {
    cell.get_or_init(|| pairs.iter().copied().collect())
}

/// The Known Traits table for a network: symbolic key -> fully-qualified
/// trait identifier (`deployer.contract.trait-name`).
pub fn known_traits(network: Network) -> &'static BTreeMap<&'static str, &'static str> {
    static MAINNET: OnceLock<BTreeMap<&str, &str>> = OnceLock::new();
    static TESTNET: OnceLock<BTreeMap<&str, &str>> = OnceLock::new();
    static DEVNET: OnceLock<BTreeMap<&str, &str>> = OnceLock::new();

    match network {
        Network::Mainnet => table_for(&MAINNET, MAINNET_TRAITS),
        Network::Testnet => table_for(&TESTNET, TESTNET_TRAITS),
        Network::Devnet | Network::Mocknet => table_for(&DEVNET, DEVNET_TRAITS),
    }
}

/// The Known Addresses table for a network: symbolic key -> principal.
pub fn known_addresses(network: Network) -> &'static BTreeMap<&'static str, &'static str> {
    static MAINNET: OnceLock<BTreeMap<&str, &str>> = OnceLock::new();
    static TESTNET: OnceLock<BTreeMap<&str, &str>> = OnceLock::new();
    static DEVNET: OnceLock<BTreeMap<&str, &str>> = OnceLock::new();

    match network {
        Network::Mainnet => table_for(&MAINNET, MAINNET_ADDRESSES),
        Network::Testnet => table_for(&TESTNET, TESTNET_ADDRESSES),
        Network::Devnet | Network::Mocknet => table_for(&DEVNET, DEVNET_ADDRESSES),
    }
}

/// Resolve a symbolic trait key for a network.
pub fn lookup_trait(network: Network, key: &str) -> Option<&'static str> {
    known_traits(network).get(key).copied()
}

/// Resolve a symbolic address key for a network.
pub fn lookup_address(network: Network, key: &str) -> Option<&'static str> {
    known_addresses(network).get(key).copied()
}

/// The deployer principal for a network, used to build fully-qualified
/// contract identifiers before deployment.
pub fn deployer(network: Network) -> &'static str {
    match network {
        Network::Mainnet => MAINNET_DEPLOYER,
        Network::Testnet => TESTNET_DEPLOYER,
        Network::Devnet | Network::Mocknet => DEVNET_DEPLOYER,
    }
}

fn closest_key<'a>(
    keys: impl Iterator<Item = &'a str>,
    target: &str,
) -> Option<String> {
    keys.filter_map(|candidate| {
        let distance = levenshtein(candidate, target);
        let threshold = candidate.len().max(target.len()) * SIMILARITY_THRESHOLD_PERCENT / 100;
        (distance <= threshold).then(|| (distance, candidate))
    })
    .min_by_key(|(distance, _)| *distance)
    .map(|(_, candidate)| candidate.to_string())
}

/// The nearest known trait key to a missed lookup, if similar enough.
pub fn closest_trait_key(network: Network, key: &str) -> Option<String> {
    closest_key(known_traits(network).keys().copied(), key)
}

/// The nearest known address key to a missed lookup, if similar enough.
pub fn closest_address_key(network: Network, key: &str) -> Option<String> {
    closest_key(known_addresses(network).keys().copied(), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_trait_per_network() {
        let mainnet = lookup_trait(Network::Mainnet, "DAO_TREASURY").unwrap();
        let testnet = lookup_trait(Network::Testnet, "DAO_TREASURY").unwrap();
        assert!(mainnet.starts_with("SP"));
        assert!(testnet.starts_with("ST"));
        assert_ne!(mainnet, testnet);
    }

    #[test]
    fn test_devnet_and_mocknet_share_tables() {
        assert_eq!(
            lookup_trait(Network::Devnet, "DAO_BASE"),
            lookup_trait(Network::Mocknet, "DAO_BASE")
        );
        assert_eq!(deployer(Network::Devnet), deployer(Network::Mocknet));
    }

    #[test]
    fn test_unknown_key_returns_none() {
        assert!(lookup_trait(Network::Mainnet, "DAO_NONEXISTENT").is_none());
        assert!(lookup_address(Network::Mainnet, "NOT_A_KEY").is_none());
    }

    #[test]
    fn test_closest_key_suggestion() {
        let suggestion = closest_trait_key(Network::Testnet, "DAO_TREASRY").unwrap();
        assert_eq!(suggestion, "DAO_TREASURY");
    }

    #[test]
    fn test_closest_key_rejects_distant_strings() {
        assert!(closest_trait_key(Network::Testnet, "completely-unrelated-zzz").is_none());
    }

    #[test]
    fn test_every_network_has_deployer_address() {
        for network in Network::ALL {
            assert_eq!(
                lookup_address(network, "DEPLOYER"),
                Some(deployer(network))
            );
        }
    }
}
