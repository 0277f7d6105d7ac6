//! Gateway error types.
//!
//! Every handler failure is an [`ApiError`]; the dispatcher turns it into a
//! fail envelope so nothing else ever reaches the caller.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::indexer::IndexError;
use crate::ports::outbound::CollaboratorError;

/// Error codes carried in the `code` field of a fail envelope.
pub mod codes {
    // Framing errors
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Server errors (-32000 to -32099)
    pub const COLLABORATOR_FAILURE: i32 = -32000;
    pub const LIMIT_EXCEEDED: i32 = -32005;
    pub const AMOUNT_OVERFLOW: i32 = -32007;
}

/// Structured handler failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Body is not valid JSON.
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Body is JSON but not an object.
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    /// The fixed failure for any path that is not in the endpoint table.
    pub fn not_found() -> Self {
        Self::new(codes::NOT_FOUND, "not found")
    }

    /// Body does not decode into the handler's request type.
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }

    /// An account, asset, wallet or chain call failed; the upstream message is kept verbatim.
    pub fn collaborator(details: impl Into<String>) -> Self {
        Self::new(codes::COLLABORATOR_FAILURE, details.into())
    }

    /// Request body larger than the configured limit.
    pub fn limit_exceeded(limit: impl Into<String>) -> Self {
        Self::new(
            codes::LIMIT_EXCEEDED,
            format!("Limit exceeded: {}", limit.into()),
        )
    }

    /// HTTP status used when this error is written as a fail envelope.
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            codes::NOT_FOUND => StatusCode::NOT_FOUND,
            codes::LIMIT_EXCEEDED => StatusCode::PAYLOAD_TOO_LARGE,
            codes::INTERNAL_ERROR | codes::AMOUNT_OVERFLOW => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            ApiError::parse_error(e.to_string())
        } else {
            ApiError::invalid_params(e.to_string())
        }
    }
}

impl From<CollaboratorError> for ApiError {
    fn from(e: CollaboratorError) -> Self {
        ApiError::collaborator(e.to_string())
    }
}

impl From<IndexError> for ApiError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::AmountOverflow {
                ref account_id,
                ref asset_id,
            } => ApiError::with_data(
                codes::AMOUNT_OVERFLOW,
                e.to_string(),
                serde_json::json!({
                    "account_id": account_id,
                    "asset_id": asset_id,
                }),
            ),
        }
    }
}

/// Result type for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Process-level errors (startup, binding, registration).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server bind error: {0}")]
    Bind(String),

    /// Endpoint table could not be built; never deferred to request time.
    #[error("endpoint registration error: {0}")]
    Registration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_fixed() {
        let a = ApiError::not_found();
        let b = ApiError::not_found();
        assert_eq!(a, b);
        assert_eq!(a.code, codes::NOT_FOUND);
        assert_eq!(a.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::invalid_params("missing field `auth`");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("-32602"));
        assert!(json.contains("missing field `auth`"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let api_err: ApiError = json_err.unwrap_err().into();
        assert_eq!(api_err.code, codes::PARSE_ERROR);
    }

    #[test]
    fn test_collaborator_message_kept_verbatim() {
        let err: ApiError = CollaboratorError::Failed("account store offline".into()).into();
        assert_eq!(err.code, codes::COLLABORATOR_FAILURE);
        assert_eq!(err.message, "account store offline");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_overflow_carries_key() {
        let err: ApiError = IndexError::AmountOverflow {
            account_id: "acc1".into(),
            asset_id: "aa".into(),
        }
        .into();
        assert_eq!(err.code, codes::AMOUNT_OVERFLOW);
        assert_eq!(err.data.as_ref().unwrap()["account_id"], "acc1");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_limit_exceeded_status() {
        let err = ApiError::limit_exceeded("body too large");
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
