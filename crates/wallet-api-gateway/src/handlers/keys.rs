//! Key management endpoints.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use super::upstream;
use crate::domain::error::ApiResult;
use crate::domain::types::{CreateKeyRequest, DeleteKeyRequest, Empty, ResetPasswordRequest};
use crate::ports::KeyStore;
use crate::registry::RequestContext;

pub struct KeysRpc {
    keys: Arc<dyn KeyStore>,
}

impl KeysRpc {
    pub fn new(keys: Arc<dyn KeyStore>) -> Self {
        Self { keys }
    }

    // Passwords never reach the span.
    #[instrument(skip_all, fields(request_id = %ctx.request_id, alias = %req.alias))]
    pub async fn create_key(&self, ctx: RequestContext, req: CreateKeyRequest) -> ApiResult<Value> {
        self.keys
            .create_key(&req.alias, &req.password)
            .await
            .map_err(upstream("create-key"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn list_keys(&self, ctx: RequestContext, _req: Empty) -> ApiResult<Vec<Value>> {
        self.keys.list_keys().await.map_err(upstream("list-keys"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn delete_key(&self, ctx: RequestContext, req: DeleteKeyRequest) -> ApiResult<()> {
        self.keys
            .delete_key(&req.xpub, &req.password)
            .await
            .map_err(upstream("delete-key"))
    }

    #[instrument(skip_all, fields(request_id = %ctx.request_id))]
    pub async fn reset_password(
        &self,
        ctx: RequestContext,
        req: ResetPasswordRequest,
    ) -> ApiResult<()> {
        self.keys
            .reset_password(&req.xpub, &req.old_password, &req.new_password)
            .await
            .map_err(upstream("reset-password"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryNode;

    #[tokio::test]
    async fn test_key_lifecycle() {
        let node = MemoryNode::new();
        let rpc = KeysRpc::new(node.keys());

        let key = rpc
            .create_key(
                RequestContext::new("create-key"),
                CreateKeyRequest {
                    alias: "main".into(),
                    password: "pw".into(),
                },
            )
            .await
            .unwrap();
        let xpub = key["xpub"].as_str().unwrap().to_string();

        let wrong = rpc
            .delete_key(
                RequestContext::new("delete-key"),
                DeleteKeyRequest {
                    xpub: xpub.clone(),
                    password: "nope".into(),
                },
            )
            .await;
        assert!(wrong.is_err());

        rpc.reset_password(
            RequestContext::new("reset-password"),
            ResetPasswordRequest {
                xpub: xpub.clone(),
                old_password: "pw".into(),
                new_password: "pw2".into(),
            },
        )
        .await
        .unwrap();

        rpc.delete_key(
            RequestContext::new("delete-key"),
            DeleteKeyRequest {
                xpub,
                password: "pw2".into(),
            },
        )
        .await
        .unwrap();

        let keys = rpc
            .list_keys(RequestContext::new("list-keys"), Empty {})
            .await
            .unwrap();
        assert!(keys.is_empty());
    }
}
