//! Account endpoints.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::upstream;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{
    CreateAccountRequest, CreateReceiverRequest, DeleteAccountRequest, IdFilter, UpdateTagsRequest,
};
use crate::ports::AccountsService;
use crate::registry::RequestContext;

pub struct AccountsRpc {
    accounts: Arc<dyn AccountsService>,
}

impl AccountsRpc {
    pub fn new(accounts: Arc<dyn AccountsService>) -> Self {
        Self { accounts }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn create_account(
        &self,
        ctx: RequestContext,
        req: CreateAccountRequest,
    ) -> ApiResult<Value> {
        self.accounts
            .create_account(req.root_xpubs, req.quorum, req.alias, req.tags)
            .await
            .map_err(upstream("create-account"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn update_account_tags(
        &self,
        ctx: RequestContext,
        req: UpdateTagsRequest,
    ) -> ApiResult<()> {
        let target = tag_target(&req)?;
        self.accounts
            .update_tags(target, req.tags.clone())
            .await
            .map_err(upstream("update-account-tags"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn create_account_receiver(
        &self,
        ctx: RequestContext,
        req: CreateReceiverRequest,
    ) -> ApiResult<Value> {
        self.accounts
            .create_receiver(&req.account_info, req.expires_at)
            .await
            .map_err(upstream("create-account-receiver"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_accounts(
        &self,
        ctx: RequestContext,
        filter: IdFilter,
    ) -> ApiResult<Vec<Value>> {
        self.accounts
            .list_accounts(&filter.id)
            .await
            .map_err(upstream("list-accounts"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn delete_account(
        &self,
        ctx: RequestContext,
        req: DeleteAccountRequest,
    ) -> ApiResult<()> {
        self.accounts
            .delete_account(&req.account_info)
            .await
            .map_err(upstream("delete-account"))
    }
}

/// Tag updates address the record by id, falling back to alias.
pub(super) fn tag_target(req: &UpdateTagsRequest) -> ApiResult<&str> {
    req.id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| req.alias.as_deref().filter(|alias| !alias.is_empty()))
        .ok_or_else(|| ApiError::invalid_params("either id or alias is required"))
}
