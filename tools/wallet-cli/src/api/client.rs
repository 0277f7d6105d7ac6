//! Wallet API client for communicating with the gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::types::{Envelope, Status};
use crate::domain::exit;

/// Errors that can occur when talking to the gateway, or before we do.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ClientError::Validation(_) => exit::LOCAL_EXEC,
            ClientError::Http(_) | ClientError::Connection(_) => exit::CONNECTION,
            ClientError::Parse(_) => exit::LOCAL_PARSE,
            ClientError::Remote { .. } => exit::REMOTE,
        }
    }
}

/// One request/response round trip against a gateway endpoint.
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// POST `body` to `/<path>` and return the envelope's data.
    async fn call(&self, path: &str, body: Value) -> Result<Value, ClientError>;
}

/// HTTP client for the wallet gateway.
pub struct WalletApiClient {
    client: Client,
    base_url: String,
}

impl WalletApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WalletApi for WalletApiClient {
    async fn call(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(url = %url, "Calling wallet API");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ClientError::Connection(format!("Cannot connect to {}", self.base_url))
                } else {
                    ClientError::Http(e)
                }
            })?;

        let bytes = response.bytes().await.map_err(ClientError::Http)?;
        decode_envelope(&bytes)
    }
}

/// Unwrap a gateway envelope into its data, or the remote failure it reports.
pub fn decode_envelope(bytes: &[u8]) -> Result<Value, ClientError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| ClientError::Parse(e.to_string()))?;

    match envelope.status {
        Status::Success => Ok(envelope.data.unwrap_or(Value::Null)),
        Status::Fail => Err(ClientError::Remote {
            code: envelope.code.unwrap_or_default(),
            message: envelope.error_detail.unwrap_or_default(),
        }),
    }
}
