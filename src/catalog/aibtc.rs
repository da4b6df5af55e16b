//! Builtin catalog for the aibtc modular DAO suite.
//!
//! Statically composed from one function per domain partition (base,
//! extensions, actions, proposals, token), mirroring how the contract suite
//! itself is organized. Template bodies live under `templates/` in the
//! repository and are addressed by each entry's `template_path`.
//!
//! The suite follows the executor-DAO pattern: one base contract that
//! dispatches to swappable extension contracts, action contracts invokable
//! through action proposals, and a paired token + DEX where the token embeds
//! a commitment hash of the not-yet-deployed DEX identifier.

use super::category::{ContractCategory, ContractSubcategory};
use super::{
    AddressReference, Catalog, ContractAddressReference, RuntimeValueReference, TemplateEntry,
    TraitReference,
};
use crate::core::ForgeError;

fn entry(
    name: &str,
    friendly_name: &str,
    template_path: &str,
    category: ContractCategory,
    subcategory: ContractSubcategory,
    deployment_order: Option<u32>,
) -> TemplateEntry {
    TemplateEntry {
        name: name.to_string(),
        friendly_name: friendly_name.to_string(),
        template_path: template_path.to_string(),
        category,
        subcategory,
        deployment_order,
        clarity_version: Some(2),
        required_traits: vec![],
        required_addresses: vec![],
        required_contract_addresses: vec![],
        required_runtime_values: vec![],
    }
}

fn trait_ref(key: &str, template_key: &str) -> TraitReference {
    TraitReference {
        key: key.to_string(),
        template_key: template_key.to_string(),
    }
}

fn address_ref(key: &str, template_key: &str) -> AddressReference {
    AddressReference {
        key: key.to_string(),
        template_key: template_key.to_string(),
    }
}

fn contract_ref(
    template_key: &str,
    category: ContractCategory,
    subcategory: ContractSubcategory,
) -> ContractAddressReference {
    ContractAddressReference {
        template_key: template_key.to_string(),
        category,
        subcategory,
    }
}

fn runtime_ref(template_key: &str) -> RuntimeValueReference {
    RuntimeValueReference {
        template_key: template_key.to_string(),
    }
}

fn base_contracts() -> Vec<TemplateEntry> {
    let mut base_dao = entry(
        "aibtc-base-dao",
        "Base DAO",
        "base/aibtc-base-dao.clar",
        ContractCategory::Base,
        ContractSubcategory::Dao,
        Some(0),
    );
    base_dao.required_traits = vec![
        trait_ref("DAO_BASE", "base_dao_trait"),
        trait_ref("DAO_PROPOSAL", "proposal_trait"),
        trait_ref("DAO_EXTENSION", "extension_trait"),
    ];
    vec![base_dao]
}

fn token_contracts() -> Vec<TemplateEntry> {
    let mut token = entry(
        "aibtc-token",
        "DAO Token",
        "token/aibtc-token.clar",
        ContractCategory::Token,
        ContractSubcategory::Dao,
        Some(1),
    );
    token.required_traits = vec![trait_ref("SIP10", "sip10_trait")];
    token.required_runtime_values = vec![
        runtime_ref("token_symbol"),
        runtime_ref("token_name"),
        runtime_ref("token_max_supply"),
        runtime_ref("token_uri"),
        // Commitment hash of the paired DEX's fully-qualified identifier,
        // computed by the caller before either contract exists on chain.
        runtime_ref("token_dex_commitment"),
    ];

    let mut dex = entry(
        "aibtc-token-dex",
        "Token DEX",
        "token/aibtc-token-dex.clar",
        ContractCategory::Token,
        ContractSubcategory::Dex,
        Some(2),
    );
    dex.required_traits = vec![trait_ref("SIP10", "sip10_trait")];
    dex.required_addresses = vec![
        address_ref("BITFLOW_CORE", "bitflow_core_contract"),
        address_ref("BITFLOW_FEE", "bitflow_fee_address"),
    ];
    dex.required_contract_addresses =
        vec![contract_ref("token_contract", ContractCategory::Token, ContractSubcategory::Dao)];

    let mut pool = entry(
        "aibtc-bitflow-pool",
        "Bitflow Pool",
        "token/aibtc-bitflow-pool.clar",
        ContractCategory::Token,
        ContractSubcategory::Pool,
        Some(3),
    );
    pool.required_traits = vec![trait_ref("POOL", "pool_trait"), trait_ref("SIP10", "sip10_trait")];
    pool.required_addresses = vec![
        address_ref("BITFLOW_CORE", "bitflow_core_contract"),
        address_ref("BITFLOW_STX_TOKEN", "bitflow_stx_token_address"),
    ];
    pool.required_contract_addresses = vec![
        contract_ref("token_contract", ContractCategory::Token, ContractSubcategory::Dao),
        contract_ref("dex_contract", ContractCategory::Token, ContractSubcategory::Dex),
    ];

    vec![token, dex, pool]
}

fn extension_contracts() -> Vec<TemplateEntry> {
    let mut messaging = entry(
        "aibtc-onchain-messaging",
        "On-chain Messaging",
        "extensions/aibtc-onchain-messaging.clar",
        ContractCategory::Extensions,
        ContractSubcategory::Messaging,
        Some(4),
    );
    messaging.required_traits = vec![
        trait_ref("DAO_EXTENSION", "extension_trait"),
        trait_ref("DAO_MESSAGING", "messaging_trait"),
    ];
    messaging.required_contract_addresses =
        vec![contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao)];

    let mut treasury = entry(
        "aibtc-treasury",
        "Treasury",
        "extensions/aibtc-treasury.clar",
        ContractCategory::Extensions,
        ContractSubcategory::Treasury,
        Some(5),
    );
    treasury.required_traits = vec![
        trait_ref("DAO_EXTENSION", "extension_trait"),
        trait_ref("DAO_TREASURY", "treasury_trait"),
        trait_ref("SIP10", "sip10_trait"),
        trait_ref("SIP09", "sip9_trait"),
    ];
    treasury.required_addresses = vec![address_ref("POX", "pox_contract")];
    treasury.required_contract_addresses =
        vec![contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao)];

    let mut action_proposals = entry(
        "aibtc-action-proposals",
        "Action Proposals",
        "extensions/aibtc-action-proposals.clar",
        ContractCategory::Extensions,
        ContractSubcategory::ActionProposals,
        Some(6),
    );
    action_proposals.required_traits = vec![
        trait_ref("DAO_EXTENSION", "extension_trait"),
        trait_ref("DAO_ACTION", "action_trait"),
    ];
    action_proposals.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("token_contract", ContractCategory::Token, ContractSubcategory::Dao),
    ];

    let mut core_proposals = entry(
        "aibtc-core-proposals",
        "Core Proposals",
        "extensions/aibtc-core-proposals.clar",
        ContractCategory::Extensions,
        ContractSubcategory::CoreProposals,
        Some(7),
    );
    core_proposals.required_traits = vec![
        trait_ref("DAO_EXTENSION", "extension_trait"),
        trait_ref("DAO_PROPOSAL", "proposal_trait"),
    ];
    core_proposals.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("token_contract", ContractCategory::Token, ContractSubcategory::Dao),
    ];

    let mut charter = entry(
        "aibtc-dao-charter",
        "DAO Charter",
        "extensions/aibtc-dao-charter.clar",
        ContractCategory::Extensions,
        ContractSubcategory::Charter,
        Some(8),
    );
    charter.required_traits = vec![
        trait_ref("DAO_EXTENSION", "extension_trait"),
        trait_ref("DAO_CHARTER", "charter_trait"),
    ];
    charter.required_contract_addresses =
        vec![contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao)];
    charter.required_runtime_values = vec![runtime_ref("dao_charter_text")];

    let mut payments = entry(
        "aibtc-payments-invoices",
        "Payments and Invoices",
        "extensions/aibtc-payments-invoices.clar",
        ContractCategory::Extensions,
        ContractSubcategory::Payments,
        Some(9),
    );
    payments.required_traits = vec![
        trait_ref("DAO_EXTENSION", "extension_trait"),
        trait_ref("DAO_INVOICES", "invoices_trait"),
        trait_ref("DAO_RESOURCES", "resources_trait"),
    ];
    payments.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("treasury_contract", ContractCategory::Extensions, ContractSubcategory::Treasury),
    ];

    let mut token_owner = entry(
        "aibtc-token-owner",
        "Token Owner",
        "extensions/aibtc-token-owner.clar",
        ContractCategory::Extensions,
        ContractSubcategory::TokenOwner,
        Some(10),
    );
    token_owner.required_traits = vec![trait_ref("DAO_EXTENSION", "extension_trait")];
    token_owner.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("token_contract", ContractCategory::Token, ContractSubcategory::Dao),
    ];

    vec![messaging, treasury, action_proposals, core_proposals, charter, payments, token_owner]
}

fn action_contracts() -> Vec<TemplateEntry> {
    let mut send_message = entry(
        "aibtc-action-send-message",
        "Action: Send Message",
        "actions/aibtc-action-send-message.clar",
        ContractCategory::Actions,
        ContractSubcategory::Messaging,
        None,
    );
    send_message.required_traits = vec![trait_ref("DAO_ACTION", "action_trait")];
    send_message.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("messaging_contract", ContractCategory::Extensions, ContractSubcategory::Messaging),
    ];

    // The source catalog carried two identical "toggle-resource" entries;
    // reconciled to one here since duplicate names fail catalog load.
    let mut toggle_resource = entry(
        "aibtc-action-toggle-resource",
        "Action: Toggle Resource",
        "actions/aibtc-action-toggle-resource.clar",
        ContractCategory::Actions,
        ContractSubcategory::Resources,
        None,
    );
    toggle_resource.required_traits = vec![trait_ref("DAO_ACTION", "action_trait")];
    toggle_resource.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("payments_contract", ContractCategory::Extensions, ContractSubcategory::Payments),
    ];
    toggle_resource.required_runtime_values = vec![runtime_ref("resource_name")];

    let mut withdraw_stx = entry(
        "aibtc-action-treasury-withdraw-stx",
        "Action: Treasury Withdraw STX",
        "actions/aibtc-action-treasury-withdraw-stx.clar",
        ContractCategory::Actions,
        ContractSubcategory::Treasury,
        None,
    );
    withdraw_stx.required_traits = vec![trait_ref("DAO_ACTION", "action_trait")];
    withdraw_stx.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("treasury_contract", ContractCategory::Extensions, ContractSubcategory::Treasury),
        contract_ref("messaging_contract", ContractCategory::Extensions, ContractSubcategory::Messaging),
    ];
    withdraw_stx.required_runtime_values = vec![runtime_ref("stx_amount")];

    vec![send_message, toggle_resource, withdraw_stx]
}

fn proposal_contracts() -> Vec<TemplateEntry> {
    let mut bootstrap = entry(
        "aibtc-base-bootstrap-initialization",
        "Bootstrap Initialization",
        "proposals/aibtc-base-bootstrap-initialization.clar",
        ContractCategory::Proposals,
        ContractSubcategory::Bootstrap,
        Some(11),
    );
    bootstrap.required_traits = vec![trait_ref("DAO_PROPOSAL", "proposal_trait")];
    bootstrap.required_contract_addresses = vec![
        contract_ref("base_dao_contract", ContractCategory::Base, ContractSubcategory::Dao),
        contract_ref("messaging_contract", ContractCategory::Extensions, ContractSubcategory::Messaging),
        contract_ref("treasury_contract", ContractCategory::Extensions, ContractSubcategory::Treasury),
        contract_ref("action_proposals_contract", ContractCategory::Extensions, ContractSubcategory::ActionProposals),
        contract_ref("core_proposals_contract", ContractCategory::Extensions, ContractSubcategory::CoreProposals),
    ];
    bootstrap.required_runtime_values = vec![runtime_ref("dao_manifest")];

    vec![bootstrap]
}

/// The full aibtc DAO catalog, assembled from its domain partitions.
pub fn catalog() -> Result<Catalog, ForgeError> {
    let mut entries = Vec::new();
    entries.extend(base_contracts());
    entries.extend(token_contracts());
    entries.extend(extension_contracts());
    entries.extend(action_contracts());
    entries.extend(proposal_contracts());
    Catalog::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = catalog().unwrap();
        assert!(catalog.len() >= 14);
        assert!(catalog.get("aibtc-base-dao").is_some());
        assert!(catalog.get("aibtc-action-treasury-withdraw-stx").is_some());
    }

    #[test]
    fn test_one_producer_per_pair() {
        let catalog = catalog().unwrap();
        for entry in catalog.entries() {
            let producers = catalog.producers(entry.category, entry.subcategory);
            assert_eq!(
                producers.len(),
                1,
                "{}/{} has {} producers",
                entry.category,
                entry.subcategory,
                producers.len()
            );
        }
    }

    #[test]
    fn test_withdraw_action_declares_scenario_requirements() {
        let catalog = catalog().unwrap();
        let entry = catalog.get("aibtc-action-treasury-withdraw-stx").unwrap();
        assert!(entry.required_runtime_values.iter().any(|r| r.template_key == "stx_amount"));
        assert!(entry.required_contract_addresses.iter().any(|r| {
            r.category == ContractCategory::Extensions
                && r.subcategory == ContractSubcategory::Treasury
        }));
    }
}
