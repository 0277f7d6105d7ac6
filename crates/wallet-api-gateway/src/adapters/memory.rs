//! In-memory collaborators.
//!
//! Backs the `--demo` server and the test suites. State lives behind
//! `parking_lot` locks; the call counters let tests assert that a rejected
//! request never reached a collaborator.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::domain::types::{Action, UnspentOutput};
use crate::ports::{
    AccountsService, AliasResolver, AssetsService, ChainService, CollaboratorError,
    CollaboratorResult, KeyStore, NetworkService, TransactionService, TxFeedService,
    WalletService,
};
use crate::registry::{NodeServices, RegistryBuilder};

fn random_hex() -> String {
    hex::encode(Uuid::new_v4().as_bytes())
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCOUNTS / ASSETS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Record {
    id: String,
    alias: String,
    root_xpubs: Vec<String>,
    quorum: u32,
    tags: Map<String, Value>,
    definition: Map<String, Value>,
}

impl Record {
    fn named(id: &str, alias: &str) -> Self {
        Self {
            id: id.to_string(),
            alias: alias.to_string(),
            root_xpubs: Vec::new(),
            quorum: 1,
            tags: Map::new(),
            definition: Map::new(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "alias": self.alias,
            "root_xpubs": self.root_xpubs,
            "quorum": self.quorum,
            "tags": self.tags,
            "definition": self.definition,
        })
    }
}

/// Ordered record store shared by accounts and assets.
#[derive(Default)]
struct Records {
    by_id: RwLock<BTreeMap<String, Record>>,
}

impl Records {
    fn insert(&self, record: Record) {
        self.by_id.write().insert(record.id.clone(), record);
    }

    fn alias(&self, id: &str) -> String {
        self.by_id
            .read()
            .get(id)
            .map(|r| r.alias.clone())
            .unwrap_or_default()
    }

    fn list(&self, id_filter: &str) -> Vec<Value> {
        self.by_id
            .read()
            .values()
            .filter(|r| id_filter.is_empty() || r.id == id_filter)
            .map(Record::to_json)
            .collect()
    }

    fn create(
        &self,
        prefix: &str,
        root_xpubs: Vec<String>,
        quorum: u32,
        alias: String,
        tags: Option<Map<String, Value>>,
        definition: Option<Map<String, Value>>,
    ) -> CollaboratorResult<Value> {
        if root_xpubs.is_empty() {
            return Err(CollaboratorError::Failed("at least one root xpub is required".into()));
        }
        if quorum == 0 || quorum as usize > root_xpubs.len() {
            return Err(CollaboratorError::Failed(format!(
                "quorum must be between 1 and {}",
                root_xpubs.len()
            )));
        }

        let mut by_id = self.by_id.write();
        if by_id.values().any(|r| r.alias == alias) {
            return Err(CollaboratorError::Failed(format!("duplicate alias {alias}")));
        }

        let record = Record {
            id: format!("{prefix}{}", random_hex()),
            alias,
            root_xpubs,
            quorum,
            tags: tags.unwrap_or_default(),
            definition: definition.unwrap_or_default(),
        };
        let out = record.to_json();
        by_id.insert(record.id.clone(), record);
        Ok(out)
    }

    fn find_id(&self, id_or_alias: &str) -> Option<String> {
        let by_id = self.by_id.read();
        if by_id.contains_key(id_or_alias) {
            return Some(id_or_alias.to_string());
        }
        by_id
            .values()
            .find(|r| r.alias == id_or_alias)
            .map(|r| r.id.clone())
    }

    fn update_tags(&self, id_or_alias: &str, tags: Map<String, Value>) -> CollaboratorResult<()> {
        let id = self
            .find_id(id_or_alias)
            .ok_or_else(|| CollaboratorError::NotFound(id_or_alias.to_string()))?;
        if let Some(record) = self.by_id.write().get_mut(&id) {
            record.tags = tags;
        }
        Ok(())
    }

    fn remove(&self, id_or_alias: &str) -> CollaboratorResult<()> {
        let id = self
            .find_id(id_or_alias)
            .ok_or_else(|| CollaboratorError::NotFound(id_or_alias.to_string()))?;
        self.by_id.write().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAccounts {
    records: Records,
}

impl AliasResolver for MemoryAccounts {
    fn alias_by_id(&self, id: &str) -> String {
        self.records.alias(id)
    }
}

#[async_trait]
impl AccountsService for MemoryAccounts {
    async fn list_accounts(&self, id_filter: &str) -> CollaboratorResult<Vec<Value>> {
        Ok(self.records.list(id_filter))
    }

    async fn create_account(
        &self,
        root_xpubs: Vec<String>,
        quorum: u32,
        alias: String,
        tags: Option<Map<String, Value>>,
    ) -> CollaboratorResult<Value> {
        self.records
            .create("acc", root_xpubs, quorum, alias, tags, None)
    }

    async fn delete_account(&self, account_info: &str) -> CollaboratorResult<()> {
        self.records.remove(account_info)
    }

    async fn update_tags(
        &self,
        id_or_alias: &str,
        tags: Map<String, Value>,
    ) -> CollaboratorResult<()> {
        self.records.update_tags(id_or_alias, tags)
    }

    async fn create_receiver(
        &self,
        account_info: &str,
        expires_at: Option<String>,
    ) -> CollaboratorResult<Value> {
        let id = self
            .records
            .find_id(account_info)
            .ok_or_else(|| CollaboratorError::NotFound(account_info.to_string()))?;
        Ok(json!({
            "account_id": id,
            "control_program": format!("0014{}", &random_hex()[..40]),
            "expires_at": expires_at,
        }))
    }
}

#[derive(Default)]
pub struct MemoryAssets {
    records: Records,
}

impl AliasResolver for MemoryAssets {
    fn alias_by_id(&self, id: &str) -> String {
        self.records.alias(id)
    }
}

#[async_trait]
impl AssetsService for MemoryAssets {
    async fn list_assets(&self, id_filter: &str) -> CollaboratorResult<Vec<Value>> {
        Ok(self.records.list(id_filter))
    }

    async fn create_asset(
        &self,
        root_xpubs: Vec<String>,
        quorum: u32,
        alias: String,
        tags: Option<Map<String, Value>>,
        definition: Option<Map<String, Value>>,
    ) -> CollaboratorResult<Value> {
        self.records
            .create("", root_xpubs, quorum, alias, tags, definition)
    }

    async fn update_tags(
        &self,
        id_or_alias: &str,
        tags: Map<String, Value>,
    ) -> CollaboratorResult<()> {
        self.records.update_tags(id_or_alias, tags)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// WALLET
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryWallet {
    utxos: RwLock<Vec<UnspentOutput>>,
    transactions: RwLock<Vec<(String, String)>>,
    failure: RwLock<Option<String>>,
    utxo_calls: AtomicUsize,
}

impl MemoryWallet {
    fn check(&self) -> CollaboratorResult<()> {
        match self.failure.read().as_ref() {
            Some(message) => Err(CollaboratorError::Failed(message.clone())),
            None => Ok(()),
        }
    }

    fn tx_json(tx_id: &str, account_id: &str) -> Value {
        json!({ "id": tx_id, "account_id": account_id })
    }
}

#[async_trait]
impl WalletService for MemoryWallet {
    async fn account_utxos(&self, id_filter: &str) -> CollaboratorResult<Vec<UnspentOutput>> {
        self.utxo_calls.fetch_add(1, Ordering::Relaxed);
        self.check()?;
        Ok(self
            .utxos
            .read()
            .iter()
            .filter(|u| id_filter.is_empty() || hex::encode(&u.output_id) == id_filter)
            .cloned()
            .collect())
    }

    async fn transactions_by_account_id(&self, account_id: &str) -> CollaboratorResult<Vec<Value>> {
        self.check()?;
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|(_, account)| account == account_id)
            .map(|(id, account)| Self::tx_json(id, account))
            .collect())
    }

    async fn transactions_by_tx_id(&self, tx_id: &str) -> CollaboratorResult<Vec<Value>> {
        self.check()?;
        Ok(self
            .transactions
            .read()
            .iter()
            .filter(|(id, _)| tx_id.is_empty() || id == tx_id)
            .map(|(id, account)| Self::tx_json(id, account))
            .collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// KEYS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct StoredKey {
    alias: String,
    xpub: String,
    password: String,
}

#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<Vec<StoredKey>>,
}

impl MemoryKeyStore {
    fn verify(&self, xpub: &str, password: &str) -> CollaboratorResult<()> {
        let keys = self.keys.read();
        let key = keys
            .iter()
            .find(|k| k.xpub == xpub)
            .ok_or_else(|| CollaboratorError::NotFound(xpub.to_string()))?;
        if key.password != password {
            return Err(CollaboratorError::Failed("invalid password".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn create_key(&self, alias: &str, password: &str) -> CollaboratorResult<Value> {
        let mut keys = self.keys.write();
        if keys.iter().any(|k| k.alias == alias) {
            return Err(CollaboratorError::Failed(format!("duplicate key alias {alias}")));
        }
        let key = StoredKey {
            alias: alias.to_string(),
            xpub: random_hex(),
            password: password.to_string(),
        };
        let out = json!({ "alias": key.alias, "xpub": key.xpub });
        keys.push(key);
        Ok(out)
    }

    async fn list_keys(&self) -> CollaboratorResult<Vec<Value>> {
        Ok(self
            .keys
            .read()
            .iter()
            .map(|k| json!({ "alias": k.alias, "xpub": k.xpub }))
            .collect())
    }

    async fn delete_key(&self, xpub: &str, password: &str) -> CollaboratorResult<()> {
        self.verify(xpub, password)?;
        self.keys.write().retain(|k| k.xpub != xpub);
        Ok(())
    }

    async fn reset_password(
        &self,
        xpub: &str,
        old_password: &str,
        new_password: &str,
    ) -> CollaboratorResult<()> {
        self.verify(xpub, old_password)?;
        if let Some(key) = self.keys.write().iter_mut().find(|k| k.xpub == xpub) {
            key.password = new_password.to_string();
        }
        Ok(())
    }

    async fn sign_template(&self, template: Value, auth: &str) -> CollaboratorResult<Value> {
        let xpub = self
            .keys
            .read()
            .iter()
            .find(|k| k.password == auth)
            .map(|k| k.xpub.clone())
            .ok_or_else(|| CollaboratorError::Failed("invalid password".into()))?;

        let mut signed = match template {
            Value::Object(map) => map,
            _ => return Err(CollaboratorError::Failed("template must be an object".into())),
        };
        signed.insert("signed_by".into(), Value::String(xpub));
        signed.insert("sign_complete".into(), Value::Bool(true));
        Ok(Value::Object(signed))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSACTIONS / CHAIN / NETWORK
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MemoryTransactions {
    submit_calls: AtomicUsize,
}

#[async_trait]
impl TransactionService for MemoryTransactions {
    async fn build(&self, actions: &[Action]) -> CollaboratorResult<Value> {
        let actions = serde_json::to_value(actions)
            .map_err(|e| CollaboratorError::Failed(e.to_string()))?;
        Ok(json!({ "actions": actions, "allow_additional_actions": false }))
    }

    async fn submit(&self, template: Value) -> CollaboratorResult<Value> {
        self.submit_calls.fetch_add(1, Ordering::Relaxed);
        if template.get("signed_by").is_none() {
            return Err(CollaboratorError::Failed("template is not signed".into()));
        }
        Ok(json!({ "tx_id": random_hex() }))
    }

    async fn create_control_program(&self, kind: &str, params: Value) -> CollaboratorResult<Value> {
        Ok(json!({
            "type": kind,
            "params": params,
            "control_program": format!("0014{}", &random_hex()[..40]),
        }))
    }
}

pub struct MemoryChain {
    blocks: Vec<(String, Value)>,
}

impl Default for MemoryChain {
    fn default() -> Self {
        let hash = "0".repeat(64);
        let genesis = json!({
            "hash": hash,
            "height": 0,
            "transactions": [{ "id": "1".repeat(64) }],
        });
        Self {
            blocks: vec![(hash, genesis)],
        }
    }
}

impl MemoryChain {
    fn by_hash(&self, hash: &str) -> CollaboratorResult<&Value> {
        self.blocks
            .iter()
            .find(|(h, _)| h == hash)
            .map(|(_, block)| block)
            .ok_or_else(|| CollaboratorError::NotFound(hash.to_string()))
    }

    fn by_height(&self, height: u64) -> CollaboratorResult<&Value> {
        usize::try_from(height)
            .ok()
            .and_then(|h| self.blocks.get(h))
            .map(|(_, block)| block)
            .ok_or_else(|| CollaboratorError::NotFound(format!("block at height {height}")))
    }

    fn tx_count(block: &Value) -> u64 {
        block["transactions"].as_array().map_or(0, |txs| txs.len() as u64)
    }
}

#[async_trait]
impl ChainService for MemoryChain {
    async fn info(&self) -> CollaboratorResult<Value> {
        Ok(json!({ "network": "memory", "height": self.blocks.len() - 1 }))
    }

    async fn best_block_hash(&self) -> CollaboratorResult<String> {
        self.blocks
            .last()
            .map(|(hash, _)| hash.clone())
            .ok_or_else(|| CollaboratorError::Failed("empty chain".into()))
    }

    async fn block_height(&self) -> CollaboratorResult<u64> {
        Ok(self.blocks.len().saturating_sub(1) as u64)
    }

    async fn block_header_by_hash(&self, hash: &str) -> CollaboratorResult<Value> {
        let block = self.by_hash(hash)?;
        Ok(json!({ "hash": block["hash"], "height": block["height"] }))
    }

    async fn block_by_hash(&self, hash: &str) -> CollaboratorResult<Value> {
        self.by_hash(hash).cloned()
    }

    async fn block_by_height(&self, height: u64) -> CollaboratorResult<Value> {
        self.by_height(height).cloned()
    }

    async fn block_tx_count_by_hash(&self, hash: &str) -> CollaboratorResult<u64> {
        self.by_hash(hash).map(Self::tx_count)
    }

    async fn block_tx_count_by_height(&self, height: u64) -> CollaboratorResult<u64> {
        self.by_height(height).map(Self::tx_count)
    }
}

#[derive(Default)]
pub struct MemoryNetwork;

#[async_trait]
impl NetworkService for MemoryNetwork {
    async fn net_info(&self) -> CollaboratorResult<Value> {
        Ok(json!({ "listening": true, "syncing": false, "peer_count": 0 }))
    }

    async fn is_listening(&self) -> CollaboratorResult<bool> {
        Ok(true)
    }

    async fn is_syncing(&self) -> CollaboratorResult<bool> {
        Ok(false)
    }

    async fn peer_count(&self) -> CollaboratorResult<u64> {
        Ok(0)
    }

    async fn is_mining(&self) -> CollaboratorResult<bool> {
        Ok(false)
    }

    async fn gas_rate(&self) -> CollaboratorResult<u64> {
        Ok(1000)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSACTION FEEDS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Feed {
    id: String,
    alias: String,
    filter: String,
    client_token: Option<String>,
}

impl Feed {
    fn to_json(&self) -> Value {
        json!({ "id": self.id, "alias": self.alias, "filter": self.filter })
    }
}

#[derive(Default)]
pub struct MemoryTxFeeds {
    by_id: RwLock<BTreeMap<String, Feed>>,
}

impl MemoryTxFeeds {
    fn find_id(&self, id_or_alias: &str) -> CollaboratorResult<String> {
        let by_id = self.by_id.read();
        if by_id.contains_key(id_or_alias) {
            return Ok(id_or_alias.to_string());
        }
        by_id
            .values()
            .find(|f| f.alias == id_or_alias)
            .map(|f| f.id.clone())
            .ok_or_else(|| CollaboratorError::NotFound(id_or_alias.to_string()))
    }
}

#[async_trait]
impl TxFeedService for MemoryTxFeeds {
    async fn create_feed(
        &self,
        alias: &str,
        filter: &str,
        client_token: Option<String>,
    ) -> CollaboratorResult<Value> {
        let mut by_id = self.by_id.write();

        // A retried create with the same token returns the original feed
        if let Some(token) = &client_token {
            if let Some(feed) = by_id
                .values()
                .find(|f| f.client_token.as_ref() == Some(token))
            {
                return Ok(feed.to_json());
            }
        }
        if by_id.values().any(|f| f.alias == alias) {
            return Err(CollaboratorError::Failed(format!("duplicate alias {alias}")));
        }

        let feed = Feed {
            id: random_hex(),
            alias: alias.to_string(),
            filter: filter.to_string(),
            client_token,
        };
        let out = feed.to_json();
        by_id.insert(feed.id.clone(), feed);
        Ok(out)
    }

    async fn get_feed(&self, id_or_alias: &str) -> CollaboratorResult<Value> {
        let id = self.find_id(id_or_alias)?;
        self.by_id
            .read()
            .get(&id)
            .map(Feed::to_json)
            .ok_or_else(|| CollaboratorError::NotFound(id_or_alias.to_string()))
    }

    async fn update_feed(&self, id_or_alias: &str, filter: &str) -> CollaboratorResult<()> {
        let id = self.find_id(id_or_alias)?;
        if let Some(feed) = self.by_id.write().get_mut(&id) {
            feed.filter = filter.to_string();
        }
        Ok(())
    }

    async fn delete_feed(&self, id_or_alias: &str) -> CollaboratorResult<()> {
        let id = self.find_id(id_or_alias)?;
        self.by_id.write().remove(&id);
        Ok(())
    }

    async fn list_feeds(&self) -> CollaboratorResult<Vec<Value>> {
        Ok(self.by_id.read().values().map(Feed::to_json).collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// NODE
// ═══════════════════════════════════════════════════════════════════════════

/// A full set of in-memory collaborators.
#[derive(Clone, Default)]
pub struct MemoryNode {
    accounts: Arc<MemoryAccounts>,
    assets: Arc<MemoryAssets>,
    wallet: Arc<MemoryWallet>,
    keys: Arc<MemoryKeyStore>,
    transactions: Arc<MemoryTransactions>,
    chain: Arc<MemoryChain>,
    network: Arc<MemoryNetwork>,
    feeds: Arc<MemoryTxFeeds>,
}

impl MemoryNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// A node seeded with two accounts, one asset and a handful of outputs.
    pub fn demo() -> Self {
        let node = Self::new();
        node.add_account("acc0a1b", "alice");
        node.add_account("acc0c2d", "bob");
        node.add_asset(&"ff".repeat(32), "BTM");
        node.add_asset("a1b2c3", "GOLD");

        let utxos = [
            ("acc0a1b", vec![0xff; 32], 41_250_000_000u64),
            ("acc0a1b", vec![0xa1, 0xb2, 0xc3], 500),
            ("acc0c2d", vec![0xff; 32], 1_000_000),
            ("acc0a1b", vec![0xff; 32], 750_000),
        ];
        for (n, (account, asset, amount)) in utxos.into_iter().enumerate() {
            node.add_utxo(UnspentOutput {
                output_id: vec![n as u8; 32],
                source_id: vec![0x5a; 32],
                asset_id: asset,
                amount,
                source_pos: n as u64,
                program: vec![0x00, 0x14, n as u8],
                ref_data: Vec::new(),
                account_id: account.to_string(),
                program_index: n as u64,
                change: n % 2 == 1,
            });
        }
        node.add_transaction(&"1".repeat(64), "acc0a1b");
        node
    }

    pub fn node_services(&self) -> NodeServices {
        NodeServices {
            chain: self.chain(),
            network: self.network(),
            transactions: self.transactions(),
            feeds: self.feeds(),
        }
    }

    /// Builder with every capability attached.
    pub fn registry_builder(&self) -> RegistryBuilder {
        RegistryBuilder::new(self.node_services())
            .with_accounts(self.accounts())
            .with_assets(self.assets())
            .with_wallet(self.wallet())
            .with_keys(self.keys())
    }

    pub fn accounts(&self) -> Arc<dyn AccountsService> {
        self.accounts.clone()
    }

    pub fn assets(&self) -> Arc<dyn AssetsService> {
        self.assets.clone()
    }

    pub fn wallet(&self) -> Arc<dyn WalletService> {
        self.wallet.clone()
    }

    pub fn keys(&self) -> Arc<dyn KeyStore> {
        self.keys.clone()
    }

    pub fn transactions(&self) -> Arc<dyn TransactionService> {
        self.transactions.clone()
    }

    pub fn chain(&self) -> Arc<dyn ChainService> {
        self.chain.clone()
    }

    pub fn network(&self) -> Arc<dyn NetworkService> {
        self.network.clone()
    }

    pub fn feeds(&self) -> Arc<dyn TxFeedService> {
        self.feeds.clone()
    }

    pub fn add_account(&self, id: &str, alias: &str) {
        self.accounts.records.insert(Record::named(id, alias));
    }

    pub fn add_asset(&self, id: &str, alias: &str) {
        self.assets.records.insert(Record::named(id, alias));
    }

    pub fn add_utxo(&self, utxo: UnspentOutput) {
        self.wallet.utxos.write().push(utxo);
    }

    pub fn add_transaction(&self, tx_id: &str, account_id: &str) {
        self.wallet
            .transactions
            .write()
            .push((tx_id.to_string(), account_id.to_string()));
    }

    /// Make every wallet call fail with `message`.
    pub fn fail_wallet(&self, message: &str) {
        *self.wallet.failure.write() = Some(message.to_string());
    }

    /// Number of unspent-output fetches so far.
    pub fn utxo_calls(&self) -> usize {
        self.wallet.utxo_calls.load(Ordering::Relaxed)
    }

    pub fn submit_calls(&self) -> usize {
        self.transactions.submit_calls.load(Ordering::Relaxed)
    }

    /// Create a key protected by `password` and return its xpub.
    pub async fn create_test_key(&self, password: &str) -> String {
        let key = self
            .keys
            .create_key(&format!("key-{}", random_hex()), password)
            .await
            .unwrap_or_default();
        key["xpub"].as_str().unwrap_or_default().to_string()
    }
}
