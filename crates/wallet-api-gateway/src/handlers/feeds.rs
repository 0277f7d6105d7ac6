//! Transaction feed endpoints.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::upstream;
use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{CreateTxFeedRequest, Empty, TxFeedRef, UpdateTxFeedRequest};
use crate::ports::TxFeedService;
use crate::registry::RequestContext;

pub struct TxFeedRpc {
    feeds: Arc<dyn TxFeedService>,
}

impl TxFeedRpc {
    pub fn new(feeds: Arc<dyn TxFeedService>) -> Self {
        Self { feeds }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, alias = %req.alias))]
    pub async fn create_feed(
        &self,
        ctx: RequestContext,
        req: CreateTxFeedRequest,
    ) -> ApiResult<Value> {
        if req.alias.is_empty() {
            return Err(ApiError::invalid_params("alias is required"));
        }
        self.feeds
            .create_feed(&req.alias, &req.filter, req.client_token)
            .await
            .map_err(upstream("create-transaction-feed"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn get_feed(&self, ctx: RequestContext, req: TxFeedRef) -> ApiResult<Value> {
        let target = feed_target(req.id.as_deref(), req.alias.as_deref())?;
        self.feeds
            .get_feed(target)
            .await
            .map_err(upstream("get-transaction-feed"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn update_feed(
        &self,
        ctx: RequestContext,
        req: UpdateTxFeedRequest,
    ) -> ApiResult<()> {
        let target = feed_target(req.id.as_deref(), req.alias.as_deref())?;
        self.feeds
            .update_feed(target, &req.filter)
            .await
            .map_err(upstream("update-transaction-feed"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn delete_feed(&self, ctx: RequestContext, req: TxFeedRef) -> ApiResult<()> {
        let target = feed_target(req.id.as_deref(), req.alias.as_deref())?;
        self.feeds
            .delete_feed(target)
            .await
            .map_err(upstream("delete-transaction-feed"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_feeds(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Vec<Value>> {
        self.feeds
            .list_feeds()
            .await
            .map_err(upstream("list-transaction-feeds"))
    }
}

fn feed_target<'a>(id: Option<&'a str>, alias: Option<&'a str>) -> ApiResult<&'a str> {
    id.filter(|id| !id.is_empty())
        .or_else(|| alias.filter(|alias| !alias.is_empty()))
        .ok_or_else(|| ApiError::invalid_params("either id or alias is required"))
}
