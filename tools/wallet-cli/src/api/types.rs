//! Wire types matching the wallet gateway's envelope and build request.

use serde::{Deserialize, Serialize};

/// Envelope status (mirrors the gateway's `Status`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// Every gateway reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub error_detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub control_program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    pub auth: String,
    pub transaction: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub transaction: serde_json::Value,
}
