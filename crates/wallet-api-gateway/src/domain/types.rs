//! Request and response types for the wallet API.

use serde::{Deserialize, Deserializer, Serialize};

// ═══════════════════════════════════════════════════════════════════════════
// UNSPENT OUTPUTS (owned by the wallet collaborator, read-only here)
// ═══════════════════════════════════════════════════════════════════════════

/// One spendable balance unit tied to one account and one asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnspentOutput {
    pub output_id: Vec<u8>,
    pub source_id: Vec<u8>,
    pub asset_id: Vec<u8>,
    pub amount: u64,
    pub source_pos: u64,
    pub program: Vec<u8>,
    pub ref_data: Vec<u8>,
    pub account_id: String,
    pub program_index: u64,
    pub change: bool,
}

/// Total amount of one asset held by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    #[serde(rename = "asset_alias")]
    pub alias: String,
    pub asset_id: String,
    pub amount: u64,
}

/// All asset totals of one account, assets ascending by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(rename = "id")]
    pub account_id: String,
    pub alias: String,
    pub balances: Vec<AssetAmount>,
}

/// Display form of an [`UnspentOutput`]: alias resolved, bytes hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedUnspentOutput {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias: String,
    #[serde(rename = "id")]
    pub output_id: String,
    pub asset_id: String,
    pub amount: u64,
    pub account_id: String,
    pub program_index: u64,
    pub program: String,
    pub source_id: String,
    pub source_pos: u64,
    pub ref_data: String,
    pub change: bool,
}

// ═══════════════════════════════════════════════════════════════════════════
// QUERY FILTERS
// ═══════════════════════════════════════════════════════════════════════════

/// Missing and `null` both read as the empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// `{id?}` filter shared by the list endpoints; empty means "all".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdFilter {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBalancesRequest {
    #[serde(default)]
    pub account_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTransactionsRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub account_id: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSACTION BUILDING
// ═══════════════════════════════════════════════════════════════════════════

/// Destination of a `control_receiver` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub control_program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// One step of a build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SpendAccount {
        asset_id: String,
        amount: u64,
        account_id: String,
    },
    Issue {
        asset_id: String,
        amount: u64,
    },
    ControlAccount {
        asset_id: String,
        amount: u64,
        account_id: String,
    },
    ControlReceiver {
        asset_id: String,
        amount: u64,
        receiver: Receiver,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    #[serde(alias = "Auth")]
    pub auth: String,
    pub transaction: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub transaction: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ControlProgramRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

// ═══════════════════════════════════════════════════════════════════════════
// ACCOUNTS / ASSETS / KEYS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub root_xpubs: Vec<String>,
    pub quorum: u32,
    pub alias: String,
    #[serde(default)]
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssetRequest {
    pub root_xpubs: Vec<String>,
    pub quorum: u32,
    pub alias: String,
    #[serde(default)]
    pub tags: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub definition: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTagsRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    pub tags: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteAccountRequest {
    #[serde(alias = "account_id")]
    pub account_info: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReceiverRequest {
    #[serde(alias = "account_id")]
    pub account_info: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyRequest {
    pub alias: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteKeyRequest {
    pub xpub: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub xpub: String,
    pub old_password: String,
    pub new_password: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSACTION FEEDS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTxFeedRequest {
    pub alias: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub client_token: Option<String>,
}

/// A feed named by id or alias; id wins when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxFeedRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTxFeedRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    pub filter: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// BLOCKS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHashRequest {
    pub block_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeightRequest {
    pub block_height: u64,
}

/// Request type for endpoints that take no parameters; any object is accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Empty {}
