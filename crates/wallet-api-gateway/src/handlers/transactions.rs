//! Transaction building, signing and submission.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, instrument};

use super::upstream;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{BuildRequest, ControlProgramRequest, SignRequest, SubmitRequest};
use crate::ports::{KeyStore, TransactionService};
use crate::registry::RequestContext;

/// Template construction and submission; no wallet needed.
pub struct TransactionsRpc {
    transactions: Arc<dyn TransactionService>,
}

impl TransactionsRpc {
    pub fn new(transactions: Arc<dyn TransactionService>) -> Self {
        Self { transactions }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, actions = req.actions.len()))]
    pub async fn build_transaction(
        &self,
        ctx: RequestContext,
        req: BuildRequest,
    ) -> ApiResult<Value> {
        if req.actions.is_empty() {
            return Err(ApiError::invalid_params("actions must not be empty"));
        }
        self.transactions
            .build(&req.actions)
            .await
            .map_err(upstream("build-transaction"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn submit_transaction(
        &self,
        ctx: RequestContext,
        req: SubmitRequest,
    ) -> ApiResult<Value> {
        let tx_id = self
            .transactions
            .submit(req.transaction)
            .await
            .map_err(upstream("submit-transaction"))?;
        info!(tx_id = %tx_id, "Transaction submitted");
        Ok(tx_id)
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, kind = %req.kind))]
    pub async fn create_control_program(
        &self,
        ctx: RequestContext,
        req: ControlProgramRequest,
    ) -> ApiResult<Value> {
        self.transactions
            .create_control_program(&req.kind, req.params)
            .await
            .map_err(upstream("create-control-program"))
    }
}

/// Signing needs the key store, so these endpoints are wallet-gated.
pub struct SigningRpc {
    keys: Arc<dyn KeyStore>,
    transactions: Arc<dyn TransactionService>,
}

impl SigningRpc {
    pub fn new(keys: Arc<dyn KeyStore>, transactions: Arc<dyn TransactionService>) -> Self {
        Self { keys, transactions }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn sign_transaction(
        &self,
        ctx: RequestContext,
        req: SignRequest,
    ) -> ApiResult<Value> {
        self.keys
            .sign_template(req.transaction, &req.auth)
            .await
            .map_err(upstream("sign-transaction"))
    }

    /// Sign, then submit the signed template. A signing failure stops before submission.
    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn sign_submit_transaction(
        &self,
        ctx: RequestContext,
        req: SignRequest,
    ) -> ApiResult<Value> {
        let signed = self
            .keys
            .sign_template(req.transaction, &req.auth)
            .await
            .map_err(upstream("sign-submit-transaction"))?;
        self.transactions
            .submit(signed)
            .await
            .map_err(upstream("sign-submit-transaction"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryNode;
    use crate::domain::error::codes;
    use crate::domain::types::Action;
    use serde_json::json;

    fn issue() -> Action {
        Action::Issue {
            asset_id: "aa".into(),
            amount: 100,
        }
    }

    #[tokio::test]
    async fn test_build_rejects_empty_actions() {
        let node = MemoryNode::new();
        let err = TransactionsRpc::new(node.transactions())
            .build_transaction(
                RequestContext::new("build-transaction"),
                BuildRequest { actions: vec![] },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_build_sign_submit() {
        let node = MemoryNode::new();
        let key = node.create_test_key("pw").await;
        let txs = TransactionsRpc::new(node.transactions());
        let signing = SigningRpc::new(node.keys(), node.transactions());

        let template = txs
            .build_transaction(
                RequestContext::new("build-transaction"),
                BuildRequest {
                    actions: vec![issue()],
                },
            )
            .await
            .unwrap();
        assert_eq!(template["actions"][0]["type"], "issue");

        let signed = signing
            .sign_transaction(
                RequestContext::new("sign-transaction"),
                SignRequest {
                    auth: "pw".into(),
                    transaction: template,
                },
            )
            .await
            .unwrap();
        assert_eq!(signed["signed_by"], key);

        let tx_id = txs
            .submit_transaction(
                RequestContext::new("submit-transaction"),
                SubmitRequest { transaction: signed },
            )
            .await
            .unwrap();
        assert!(tx_id["tx_id"].is_string());
    }

    #[tokio::test]
    async fn test_sign_submit_stops_on_bad_password() {
        let node = MemoryNode::new();
        node.create_test_key("pw").await;

        let err = SigningRpc::new(node.keys(), node.transactions())
            .sign_submit_transaction(
                RequestContext::new("sign-submit-transaction"),
                SignRequest {
                    auth: "wrong".into(),
                    transaction: json!({"actions": []}),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::COLLABORATOR_FAILURE);
        assert_eq!(node.submit_calls(), 0);
    }
}
