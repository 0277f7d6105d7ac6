//! Endpoint catalog: every path the gateway knows, and whether it needs the wallet.
//!
//! The registry refuses to bind a handler to a path that is not listed here, and
//! takes the availability rule from this table rather than from the caller.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

/// Availability condition of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Availability {
    /// Always registered
    Always,
    /// Registered only when both accounts and assets services are present
    RequiresWallet,
}

/// Endpoint category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointCategory {
    Account,
    Asset,
    Key,
    Transaction,
    Query,
    Block,
    Network,
    Feed,
}

/// Endpoint metadata
#[derive(Debug, Clone)]
pub struct EndpointInfo {
    pub name: &'static str,
    pub availability: Availability,
    pub category: EndpointCategory,
    pub description: &'static str,
}

impl EndpointInfo {
    const fn wallet(
        name: &'static str,
        category: EndpointCategory,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            availability: Availability::RequiresWallet,
            category,
            description,
        }
    }

    const fn always(
        name: &'static str,
        category: EndpointCategory,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            availability: Availability::Always,
            category,
            description,
        }
    }

    pub const fn requires_wallet(&self) -> bool {
        matches!(self.availability, Availability::RequiresWallet)
    }
}

use EndpointCategory::*;

const CATALOG: &[EndpointInfo] = &[
    // --- Accounts ---
    EndpointInfo::wallet("create-account", Account, "Create a multisig account"),
    EndpointInfo::wallet("update-account-tags", Account, "Replace account tags"),
    EndpointInfo::wallet("create-account-receiver", Account, "Derive a receiver for an account"),
    EndpointInfo::wallet("list-accounts", Account, "List accounts, optionally by id"),
    EndpointInfo::wallet("delete-account", Account, "Delete an account"),
    // --- Assets ---
    EndpointInfo::wallet("create-asset", Asset, "Define a new asset"),
    EndpointInfo::wallet("update-asset-tags", Asset, "Replace asset tags"),
    EndpointInfo::wallet("list-assets", Asset, "List assets, optionally by id"),
    // --- Keys ---
    EndpointInfo::wallet("create-key", Key, "Create an extended key pair"),
    EndpointInfo::wallet("list-keys", Key, "List stored public keys"),
    EndpointInfo::wallet("delete-key", Key, "Delete a stored key"),
    EndpointInfo::wallet("reset-password", Key, "Change a key password"),
    // --- Wallet queries ---
    EndpointInfo::wallet("list-transactions", Query, "List wallet transactions by id or account"),
    EndpointInfo::wallet("list-balances", Query, "Per-account, per-asset balance totals"),
    EndpointInfo::wallet("list-unspent-outputs", Query, "Annotated unspent outputs"),
    // --- Signing ---
    EndpointInfo::wallet("sign-transaction", Transaction, "Sign a transaction template"),
    EndpointInfo::wallet("sign-submit-transaction", Transaction, "Sign then submit a template"),
    // --- Transactions ---
    EndpointInfo::always("build-transaction", Transaction, "Build a template from actions"),
    EndpointInfo::always("submit-transaction", Transaction, "Submit a signed template"),
    EndpointInfo::always("create-control-program", Transaction, "Create a control program"),
    // --- Node / blocks ---
    EndpointInfo::always("info", Block, "Node information"),
    EndpointInfo::always("block-hash", Block, "Best block hash"),
    EndpointInfo::always("block-height", Block, "Best block height"),
    EndpointInfo::always("get-block-header-by-hash", Block, "Block header by hash"),
    EndpointInfo::always("get-block-by-hash", Block, "Block by hash"),
    EndpointInfo::always("get-block-by-height", Block, "Block by height"),
    EndpointInfo::always(
        "get-block-transactions-count-by-hash",
        Block,
        "Transaction count by block hash",
    ),
    EndpointInfo::always(
        "get-block-transactions-count-by-height",
        Block,
        "Transaction count by block height",
    ),
    // --- Network ---
    EndpointInfo::always("net-info", Network, "Network summary"),
    EndpointInfo::always("net-listening", Network, "Whether the node accepts peers"),
    EndpointInfo::always("net-syncing", Network, "Whether the node is syncing"),
    EndpointInfo::always("peer-count", Network, "Connected peer count"),
    EndpointInfo::always("is-mining", Network, "Whether the node is mining"),
    EndpointInfo::always("gas-rate", Network, "Current gas rate"),
    // --- Transaction feeds ---
    EndpointInfo::always("create-transaction-feed", Feed, "Create a transaction feed"),
    EndpointInfo::always("get-transaction-feed", Feed, "Transaction feed by id or alias"),
    EndpointInfo::always("update-transaction-feed", Feed, "Replace a feed filter"),
    EndpointInfo::always("delete-transaction-feed", Feed, "Delete a transaction feed"),
    EndpointInfo::always("list-transaction-feeds", Feed, "List transaction feeds"),
];

static CATALOG_INDEX: LazyLock<HashMap<&'static str, &'static EndpointInfo>> =
    LazyLock::new(|| CATALOG.iter().map(|info| (info.name, info)).collect());

/// All known endpoints, in catalog order.
pub fn catalog() -> &'static [EndpointInfo] {
    CATALOG
}

/// Look up an endpoint by path name (without the leading slash).
pub fn endpoint_info(name: &str) -> Option<&'static EndpointInfo> {
    CATALOG_INDEX.get(name).copied()
}
