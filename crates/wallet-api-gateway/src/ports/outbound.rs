//! Outbound ports: the collaborator capabilities the gateway consumes.
//!
//! Account, asset, wallet, key, chain, network and feed logic lives behind these
//! traits. Payloads the gateway only passes through are `serde_json::Value`.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::types::{Action, UnspentOutput};

/// Failure reported by a collaborator. The message reaches the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Failed(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Resolves an opaque id to a display alias.
///
/// Returns an empty string when no alias is known; lookups never fail a request.
pub trait AliasResolver: Send + Sync {
    fn alias_by_id(&self, id: &str) -> String;
}

#[async_trait]
pub trait AccountsService: AliasResolver {
    /// Empty `id_filter` lists every account.
    async fn list_accounts(&self, id_filter: &str) -> CollaboratorResult<Vec<Value>>;
    async fn create_account(
        &self,
        root_xpubs: Vec<String>,
        quorum: u32,
        alias: String,
        tags: Option<serde_json::Map<String, Value>>,
    ) -> CollaboratorResult<Value>;
    async fn delete_account(&self, account_info: &str) -> CollaboratorResult<()>;
    async fn update_tags(
        &self,
        id_or_alias: &str,
        tags: serde_json::Map<String, Value>,
    ) -> CollaboratorResult<()>;
    async fn create_receiver(
        &self,
        account_info: &str,
        expires_at: Option<String>,
    ) -> CollaboratorResult<Value>;
}

#[async_trait]
pub trait AssetsService: AliasResolver {
    async fn list_assets(&self, id_filter: &str) -> CollaboratorResult<Vec<Value>>;
    async fn create_asset(
        &self,
        root_xpubs: Vec<String>,
        quorum: u32,
        alias: String,
        tags: Option<serde_json::Map<String, Value>>,
        definition: Option<serde_json::Map<String, Value>>,
    ) -> CollaboratorResult<Value>;
    async fn update_tags(
        &self,
        id_or_alias: &str,
        tags: serde_json::Map<String, Value>,
    ) -> CollaboratorResult<()>;
}

#[async_trait]
pub trait WalletService: Send + Sync {
    /// Unspent outputs owned by wallet accounts; empty filter returns all of them.
    async fn account_utxos(&self, id_filter: &str) -> CollaboratorResult<Vec<UnspentOutput>>;
    async fn transactions_by_account_id(&self, account_id: &str) -> CollaboratorResult<Vec<Value>>;
    /// Empty `tx_id` lists every wallet transaction.
    async fn transactions_by_tx_id(&self, tx_id: &str) -> CollaboratorResult<Vec<Value>>;
}

/// Pseudo-HSM key storage and template signing.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn create_key(&self, alias: &str, password: &str) -> CollaboratorResult<Value>;
    async fn list_keys(&self) -> CollaboratorResult<Vec<Value>>;
    async fn delete_key(&self, xpub: &str, password: &str) -> CollaboratorResult<()>;
    async fn reset_password(
        &self,
        xpub: &str,
        old_password: &str,
        new_password: &str,
    ) -> CollaboratorResult<()>;
    async fn sign_template(&self, template: Value, auth: &str) -> CollaboratorResult<Value>;
}

#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Turn an action list into an unsigned template.
    async fn build(&self, actions: &[Action]) -> CollaboratorResult<Value>;
    /// Submit a signed template; returns the transaction id.
    async fn submit(&self, template: Value) -> CollaboratorResult<Value>;
    async fn create_control_program(&self, kind: &str, params: Value) -> CollaboratorResult<Value>;
}

#[async_trait]
pub trait ChainService: Send + Sync {
    async fn info(&self) -> CollaboratorResult<Value>;
    async fn best_block_hash(&self) -> CollaboratorResult<String>;
    async fn block_height(&self) -> CollaboratorResult<u64>;
    async fn block_header_by_hash(&self, hash: &str) -> CollaboratorResult<Value>;
    async fn block_by_hash(&self, hash: &str) -> CollaboratorResult<Value>;
    async fn block_by_height(&self, height: u64) -> CollaboratorResult<Value>;
    async fn block_tx_count_by_hash(&self, hash: &str) -> CollaboratorResult<u64>;
    async fn block_tx_count_by_height(&self, height: u64) -> CollaboratorResult<u64>;
}

#[async_trait]
pub trait NetworkService: Send + Sync {
    async fn net_info(&self) -> CollaboratorResult<Value>;
    async fn is_listening(&self) -> CollaboratorResult<bool>;
    async fn is_syncing(&self) -> CollaboratorResult<bool>;
    async fn peer_count(&self) -> CollaboratorResult<u64>;
    async fn is_mining(&self) -> CollaboratorResult<bool>;
    async fn gas_rate(&self) -> CollaboratorResult<u64>;
}

/// Named transaction filters that clients follow.
#[async_trait]
pub trait TxFeedService: Send + Sync {
    async fn create_feed(
        &self,
        alias: &str,
        filter: &str,
        client_token: Option<String>,
    ) -> CollaboratorResult<Value>;
    async fn get_feed(&self, id_or_alias: &str) -> CollaboratorResult<Value>;
    async fn update_feed(&self, id_or_alias: &str, filter: &str) -> CollaboratorResult<()>;
    async fn delete_feed(&self, id_or_alias: &str) -> CollaboratorResult<()>;
    async fn list_feeds(&self) -> CollaboratorResult<Vec<Value>>;
}
