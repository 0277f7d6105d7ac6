//! Chain state and block lookup endpoints.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::instrument;

use super::upstream;
use crate::domain::error::ApiResult;
use crate::domain::types::{BlockHashRequest, BlockHeightRequest, Empty};
use crate::ports::ChainService;
use crate::registry::RequestContext;

pub struct ChainRpc {
    chain: Arc<dyn ChainService>,
}

impl ChainRpc {
    pub fn new(chain: Arc<dyn ChainService>) -> Self {
        Self { chain }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn info(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        self.chain.info().await.map_err(upstream("info"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn block_hash(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let hash = self
            .chain
            .best_block_hash()
            .await
            .map_err(upstream("block-hash"))?;
        Ok(json!({ "block_hash": hash }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn block_height(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let height = self
            .chain
            .block_height()
            .await
            .map_err(upstream("block-height"))?;
        Ok(json!({ "block_height": height }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, hash = %req.block_hash))]
    pub async fn block_header_by_hash(
        &self,
        ctx: RequestContext,
        req: BlockHashRequest,
    ) -> ApiResult<Value> {
        self.chain
            .block_header_by_hash(&req.block_hash)
            .await
            .map_err(upstream("get-block-header-by-hash"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, hash = %req.block_hash))]
    pub async fn block_by_hash(
        &self,
        ctx: RequestContext,
        req: BlockHashRequest,
    ) -> ApiResult<Value> {
        self.chain
            .block_by_hash(&req.block_hash)
            .await
            .map_err(upstream("get-block-by-hash"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, height = req.block_height))]
    pub async fn block_by_height(
        &self,
        ctx: RequestContext,
        req: BlockHeightRequest,
    ) -> ApiResult<Value> {
        self.chain
            .block_by_height(req.block_height)
            .await
            .map_err(upstream("get-block-by-height"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, hash = %req.block_hash))]
    pub async fn tx_count_by_hash(
        &self,
        ctx: RequestContext,
        req: BlockHashRequest,
    ) -> ApiResult<Value> {
        let count = self
            .chain
            .block_tx_count_by_hash(&req.block_hash)
            .await
            .map_err(upstream("get-block-transactions-count-by-hash"))?;
        Ok(json!({ "count": count }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id, height = req.block_height))]
    pub async fn tx_count_by_height(
        &self,
        ctx: RequestContext,
        req: BlockHeightRequest,
    ) -> ApiResult<Value> {
        let count = self
            .chain
            .block_tx_count_by_height(req.block_height)
            .await
            .map_err(upstream("get-block-transactions-count-by-height"))?;
        Ok(json!({ "count": count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryNode;

    #[tokio::test]
    async fn test_height_and_blocks() {
        let node = MemoryNode::new();
        let rpc = ChainRpc::new(node.chain());

        let height = rpc
            .block_height(RequestContext::new("block-height"), Empty {})
            .await
            .unwrap();
        assert_eq!(height["block_height"], 0);

        let genesis = rpc
            .block_by_height(
                RequestContext::new("get-block-by-height"),
                BlockHeightRequest { block_height: 0 },
            )
            .await
            .unwrap();
        assert_eq!(genesis["height"], 0);

        let missing = rpc
            .block_by_height(
                RequestContext::new("get-block-by-height"),
                BlockHeightRequest { block_height: 99 },
            )
            .await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn test_tx_count_by_hash() {
        let node = MemoryNode::new();
        let rpc = ChainRpc::new(node.chain());

        let hash = rpc
            .block_hash(RequestContext::new("block-hash"), Empty {})
            .await
            .unwrap()["block_hash"]
            .as_str()
            .unwrap()
            .to_string();

        let count = rpc
            .tx_count_by_hash(
                RequestContext::new("get-block-transactions-count-by-hash"),
                BlockHashRequest { block_hash: hash },
            )
            .await
            .unwrap();
        assert_eq!(count["count"], 1);
    }
}
