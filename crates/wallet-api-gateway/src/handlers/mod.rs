//! Endpoint handlers, grouped by collaborator.
//!
//! Each group is a small struct holding the collaborators it needs. The two
//! `register_*` functions bind every group method to its catalog path.

pub mod accounts;
pub mod assets;
pub mod chain;
pub mod feeds;
pub mod keys;
pub mod network;
pub mod query;
pub mod transactions;

use std::sync::Arc;

use tracing::error;

use crate::domain::error::{ApiError, GatewayError};
use crate::ports::CollaboratorError;
use crate::registry::{json_handler, EndpointTable, NodeServices, WalletServices};

pub use accounts::AccountsRpc;
pub use assets::AssetsRpc;
pub use chain::ChainRpc;
pub use feeds::TxFeedRpc;
pub use keys::KeysRpc;
pub use network::NetworkRpc;
pub use query::QueryRpc;
pub use transactions::{SigningRpc, TransactionsRpc};

/// Log a collaborator failure and pass its message through.
pub(crate) fn upstream(operation: &'static str) -> impl Fn(CollaboratorError) -> ApiError {
    move |e| {
        error!(operation, error = %e, "Collaborator call failed");
        ApiError::from(e)
    }
}

/// Bind `$rpc.$method(ctx, req)` to a catalog path.
macro_rules! bind {
    ($table:expr, $path:literal, $rpc:expr, $method:ident) => {{
        let rpc = Arc::clone(&$rpc);
        $table.bind(
            $path,
            json_handler(move |ctx, req| {
                let rpc = Arc::clone(&rpc);
                async move { rpc.$method(ctx, req).await }
            }),
        )?;
    }};
}

/// Endpoints served without wallet capabilities.
pub fn register_node_endpoints(
    table: &mut EndpointTable,
    node: &NodeServices,
) -> Result<(), GatewayError> {
    let txs = Arc::new(TransactionsRpc::new(Arc::clone(&node.transactions)));
    bind!(table, "build-transaction", txs, build_transaction);
    bind!(table, "submit-transaction", txs, submit_transaction);
    bind!(table, "create-control-program", txs, create_control_program);

    let chain = Arc::new(ChainRpc::new(Arc::clone(&node.chain)));
    bind!(table, "info", chain, info);
    bind!(table, "block-hash", chain, block_hash);
    bind!(table, "block-height", chain, block_height);
    bind!(table, "get-block-header-by-hash", chain, block_header_by_hash);
    bind!(table, "get-block-by-hash", chain, block_by_hash);
    bind!(table, "get-block-by-height", chain, block_by_height);
    bind!(table, "get-block-transactions-count-by-hash", chain, tx_count_by_hash);
    bind!(table, "get-block-transactions-count-by-height", chain, tx_count_by_height);

    let net = Arc::new(NetworkRpc::new(Arc::clone(&node.network)));
    bind!(table, "net-info", net, net_info);
    bind!(table, "net-listening", net, net_listening);
    bind!(table, "net-syncing", net, net_syncing);
    bind!(table, "peer-count", net, peer_count);
    bind!(table, "is-mining", net, is_mining);
    bind!(table, "gas-rate", net, gas_rate);

    let feeds = Arc::new(TxFeedRpc::new(Arc::clone(&node.feeds)));
    bind!(table, "create-transaction-feed", feeds, create_feed);
    bind!(table, "get-transaction-feed", feeds, get_feed);
    bind!(table, "update-transaction-feed", feeds, update_feed);
    bind!(table, "delete-transaction-feed", feeds, delete_feed);
    bind!(table, "list-transaction-feeds", feeds, list_feeds);

    Ok(())
}

/// Endpoints that exist only in the wallet-enabled registry.
pub fn register_wallet_endpoints(
    table: &mut EndpointTable,
    wallet: &WalletServices,
    node: &NodeServices,
) -> Result<(), GatewayError> {
    let accounts = Arc::new(AccountsRpc::new(Arc::clone(&wallet.accounts)));
    bind!(table, "create-account", accounts, create_account);
    bind!(table, "update-account-tags", accounts, update_account_tags);
    bind!(table, "create-account-receiver", accounts, create_account_receiver);
    bind!(table, "list-accounts", accounts, list_accounts);
    bind!(table, "delete-account", accounts, delete_account);

    let assets = Arc::new(AssetsRpc::new(Arc::clone(&wallet.assets)));
    bind!(table, "create-asset", assets, create_asset);
    bind!(table, "update-asset-tags", assets, update_asset_tags);
    bind!(table, "list-assets", assets, list_assets);

    let keys = Arc::new(KeysRpc::new(Arc::clone(&wallet.keys)));
    bind!(table, "create-key", keys, create_key);
    bind!(table, "list-keys", keys, list_keys);
    bind!(table, "delete-key", keys, delete_key);
    bind!(table, "reset-password", keys, reset_password);

    let query = Arc::new(QueryRpc::new(
        Arc::clone(&wallet.accounts),
        Arc::clone(&wallet.assets),
        Arc::clone(&wallet.wallet),
    ));
    bind!(table, "list-balances", query, list_balances);
    bind!(table, "list-unspent-outputs", query, list_unspent_outputs);
    bind!(table, "list-transactions", query, list_transactions);

    let signing = Arc::new(SigningRpc::new(
        Arc::clone(&wallet.keys),
        Arc::clone(&node.transactions),
    ));
    bind!(table, "sign-transaction", signing, sign_transaction);
    bind!(table, "sign-submit-transaction", signing, sign_submit_transaction);

    Ok(())
}
