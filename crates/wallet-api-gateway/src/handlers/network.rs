//! Network and mining status endpoints.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::instrument;

use super::upstream;
use crate::domain::error::ApiResult;
use crate::domain::types::Empty;
use crate::ports::NetworkService;
use crate::registry::RequestContext;

pub struct NetworkRpc {
    network: Arc<dyn NetworkService>,
}

impl NetworkRpc {
    pub fn new(network: Arc<dyn NetworkService>) -> Self {
        Self { network }
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn net_info(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        self.network.net_info().await.map_err(upstream("net-info"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn net_listening(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let listening = self
            .network
            .is_listening()
            .await
            .map_err(upstream("net-listening"))?;
        Ok(json!({ "listening": listening }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn net_syncing(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let syncing = self
            .network
            .is_syncing()
            .await
            .map_err(upstream("net-syncing"))?;
        Ok(json!({ "syncing": syncing }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn peer_count(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let count = self
            .network
            .peer_count()
            .await
            .map_err(upstream("peer-count"))?;
        Ok(json!({ "peer_count": count }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn is_mining(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let mining = self
            .network
            .is_mining()
            .await
            .map_err(upstream("is-mining"))?;
        Ok(json!({ "is_mining": mining }))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn gas_rate(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Value> {
        let rate = self
            .network
            .gas_rate()
            .await
            .map_err(upstream("gas-rate"))?;
        Ok(json!({ "gas_rate": rate }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryNode;

    #[tokio::test]
    async fn test_status_shapes() {
        let node = MemoryNode::new();
        let rpc = NetworkRpc::new(node.network());

        let rate = rpc.gas_rate(RequestContext::new("gas-rate"), Empty {}).await.unwrap();
        assert!(rate["gas_rate"].is_u64());

        let peers = rpc.peer_count(RequestContext::new("peer-count"), Empty {}).await.unwrap();
        assert_eq!(peers["peer_count"], 0);

        let listening = rpc
            .net_listening(RequestContext::new("net-listening"), Empty {})
            .await
            .unwrap();
        assert_eq!(listening["listening"], true);
    }
}
