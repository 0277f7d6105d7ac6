//! Asset endpoints.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::{accounts::tag_target, upstream};
use crate::domain::error::ApiResult;
use crate::domain::types::{CreateAssetRequest, IdFilter, UpdateTagsRequest};
use crate::ports::AssetsService;
use crate::registry::RequestContext;

pub struct AssetsRpc {
    assets: Arc<dyn AssetsService>,
}

impl AssetsRpc {
    pub fn new(assets: Arc<dyn AssetsService>) -> Self {
        Self { assets }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn create_asset(
        &self,
        ctx: RequestContext,
        req: CreateAssetRequest,
    ) -> ApiResult<Value> {
        self.assets
            .create_asset(req.root_xpubs, req.quorum, req.alias, req.tags, req.definition)
            .await
            .map_err(upstream("create-asset"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn update_asset_tags(
        &self,
        ctx: RequestContext,
        req: UpdateTagsRequest,
    ) -> ApiResult<()> {
        let target = tag_target(&req)?;
        self.assets
            .update_tags(target, req.tags.clone())
            .await
            .map_err(upstream("update-asset-tags"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_assets(
        &self,
        ctx: RequestContext,
        filter: IdFilter,
    ) -> ApiResult<Vec<Value>> {
        self.assets
            .list_assets(&filter.id)
            .await
            .map_err(upstream("list-assets"))
    }
}
