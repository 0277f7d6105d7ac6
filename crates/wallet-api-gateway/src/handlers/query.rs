//! Wallet query endpoints: balances, unspent outputs, transactions.
//!
//! Each call fetches fresh data from the wallet collaborator; nothing is cached.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use super::upstream;
use crate::domain::error::ApiResult;
use crate::domain::types::{
    AccountBalance, AnnotatedUnspentOutput, IdFilter, ListBalancesRequest, ListTransactionsRequest,
};
use crate::indexer::{BalanceIndexer, UnspentOutputIndexer};
use crate::ports::{AccountsService, AssetsService, WalletService};
use crate::registry::RequestContext;

pub struct QueryRpc {
    accounts: Arc<dyn AccountsService>,
    assets: Arc<dyn AssetsService>,
    wallet: Arc<dyn WalletService>,
}

impl QueryRpc {
    pub fn new(
        accounts: Arc<dyn AccountsService>,
        assets: Arc<dyn AssetsService>,
        wallet: Arc<dyn WalletService>,
    ) -> Self {
        Self {
            accounts,
            assets,
            wallet,
        }
    }

    /// Balances per account and asset. An `account_id` narrows the output to
    /// that account; an unknown id yields an empty list.
    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_balances(
        &self,
        ctx: RequestContext,
        req: ListBalancesRequest,
    ) -> ApiResult<Vec<AccountBalance>> {
        let utxos = self
            .wallet
            .account_utxos("")
            .await
            .map_err(upstream("list-balances"))?;
        debug!(utxos = utxos.len(), "Indexing balances");

        let indexer = BalanceIndexer::new(self.accounts.as_ref(), self.assets.as_ref());
        let balances = match req.account_id.as_deref().filter(|id| !id.is_empty()) {
            Some(account_id) => {
                indexer.index(utxos.iter().filter(|u| u.account_id == account_id))?
            }
            None => indexer.index(&utxos)?,
        };
        Ok(balances)
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_unspent_outputs(
        &self,
        ctx: RequestContext,
        filter: IdFilter,
    ) -> ApiResult<Vec<AnnotatedUnspentOutput>> {
        let utxos = self
            .wallet
            .account_utxos(&filter.id)
            .await
            .map_err(upstream("list-unspent-outputs"))?;
        Ok(UnspentOutputIndexer::new(self.accounts.as_ref()).index(&utxos))
    }

    /// `account_id` selects by account; otherwise `id` selects by transaction
    /// id, and an empty `id` lists everything.
    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_transactions(
        &self,
        ctx: RequestContext,
        req: ListTransactionsRequest,
    ) -> ApiResult<Vec<Value>> {
        if !req.account_id.is_empty() {
            self.wallet
                .transactions_by_account_id(&req.account_id)
                .await
                .map_err(upstream("list-transactions"))
        } else {
            self.wallet
                .transactions_by_tx_id(&req.id)
                .await
                .map_err(upstream("list-transactions"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryNode;
    use crate::domain::error::codes;
    use crate::domain::types::UnspentOutput;

    fn utxo(account: &str, asset: u8, amount: u64) -> UnspentOutput {
        UnspentOutput {
            output_id: vec![asset, amount as u8],
            asset_id: vec![asset],
            account_id: account.into(),
            amount,
            ..Default::default()
        }
    }

    fn seeded() -> MemoryNode {
        let node = MemoryNode::new();
        node.add_account("acc1", "alice");
        node.add_asset("bb", "gold");
        node.add_utxo(utxo("acc2", 0xaa, 5));
        node.add_utxo(utxo("acc1", 0xbb, 3));
        node.add_utxo(utxo("acc2", 0xaa, 7));
        node
    }

    fn rpc(node: &MemoryNode) -> QueryRpc {
        QueryRpc::new(node.accounts(), node.assets(), node.wallet())
    }

    #[tokio::test]
    async fn test_list_balances_all() {
        let node = seeded();
        let out = rpc(&node)
            .list_balances(RequestContext::new("list-balances"), ListBalancesRequest::default())
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].account_id, "acc1");
        assert_eq!(out[0].alias, "alice");
        assert_eq!(out[0].balances[0].alias, "gold");
        assert_eq!(out[1].balances[0].amount, 12);
        assert_eq!(node.utxo_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_balances_account_filter() {
        let node = seeded();
        let rpc = rpc(&node);

        let out = rpc
            .list_balances(
                RequestContext::new("list-balances"),
                ListBalancesRequest {
                    account_id: Some("acc2".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].account_id, "acc2");

        let none = rpc
            .list_balances(
                RequestContext::new("list-balances"),
                ListBalancesRequest {
                    account_id: Some("ghost".into()),
                },
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_list_balances_overflow_is_error() {
        let node = MemoryNode::new();
        node.add_utxo(utxo("acc1", 0xaa, u64::MAX));
        node.add_utxo(utxo("acc1", 0xaa, 1));

        let err = rpc(&node)
            .list_balances(RequestContext::new("list-balances"), ListBalancesRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::AMOUNT_OVERFLOW);
    }

    #[tokio::test]
    async fn test_collaborator_failure_passes_through() {
        let node = seeded();
        node.fail_wallet("wallet is locked");

        let err = rpc(&node)
            .list_balances(RequestContext::new("list-balances"), ListBalancesRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.message, "wallet is locked");
    }

    #[tokio::test]
    async fn test_list_unspent_outputs_annotated() {
        let node = seeded();
        let out = rpc(&node)
            .list_unspent_outputs(RequestContext::new("list-unspent-outputs"), IdFilter::default())
            .await
            .unwrap();

        assert_eq!(out.len(), 3);
        assert_eq!(out[1].alias, "alice");
        assert_eq!(out[1].asset_id, "bb");
        assert_eq!(out[0].output_id, "aa05");
    }

    #[tokio::test]
    async fn test_list_transactions_dispatch() {
        let node = MemoryNode::new();
        node.add_transaction("tx1", "acc1");
        node.add_transaction("tx2", "acc2");
        let rpc = rpc(&node);

        let by_account = rpc
            .list_transactions(
                RequestContext::new("list-transactions"),
                ListTransactionsRequest {
                    id: "tx1".into(),
                    account_id: "acc2".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(by_account.len(), 1);
        assert_eq!(by_account[0]["id"], "tx2");

        let by_id = rpc
            .list_transactions(
                RequestContext::new("list-transactions"),
                ListTransactionsRequest {
                    id: "tx1".into(),
                    account_id: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(by_id[0]["id"], "tx1");

        let all = rpc
            .list_transactions(
                RequestContext::new("list-transactions"),
                ListTransactionsRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }
}
