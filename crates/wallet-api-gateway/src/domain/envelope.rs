//! Uniform success/fail wrapper around every reply.
//!
//! ```text
//! {"status":"success","data":<payload>}
//! {"status":"fail","code":-32601,"error_detail":"not found"}
//! ```

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl Envelope {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            status: Status::Success,
            data: Some(data),
            code: None,
            error_detail: None,
        }
    }

    pub fn fail(error: &ApiError) -> Self {
        Self {
            status: Status::Fail,
            data: error.data.clone(),
            code: Some(error.code),
            error_detail: Some(error.message.clone()),
        }
    }
}

/// Write a result as an HTTP response carrying its envelope.
pub fn envelope_response(result: ApiResult<serde_json::Value>) -> Response {
    match result {
        Ok(data) => json_response(StatusCode::OK, &Envelope::success(data)),
        Err(e) => fail_response(&e),
    }
}

/// Fail envelope with the error's own HTTP status.
pub fn fail_response(error: &ApiError) -> Response {
    json_response(error.status_code(), &Envelope::fail(error))
}

fn json_response(status: StatusCode, envelope: &Envelope) -> Response {
    // Envelope only holds JSON values and strings, so this cannot fail in practice.
    let body = serde_json::to_vec(envelope).unwrap_or_else(|_| {
        br#"{"status":"fail","error_detail":"response serialization failed"}"#.to_vec()
    });

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_shape() {
        let env = Envelope::success(serde_json::json!([1, 2]));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success", "data": [1, 2]}));
    }

    #[test]
    fn test_fail_shape() {
        let env = Envelope::fail(&ApiError::not_found());
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["status"], "fail");
        assert_eq!(json["error_detail"], "not found");
        assert_eq!(json["code"], -32601);
        assert!(json.get("data").is_none());
    }

    #[tokio::test]
    async fn test_envelope_response_status_follows_outcome() {
        let ok = envelope_response(Ok(serde_json::json!({"height": 3})));
        assert_eq!(ok.status(), StatusCode::OK);

        let err = envelope_response(Err(ApiError::internal("boom")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(err.into_body(), usize::MAX).await.unwrap();
        let env: Envelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(env.status, Status::Fail);
        assert_eq!(env.error_detail.as_deref(), Some("Internal error: boom"));
    }

    #[test]
    fn test_fail_response_status() {
        let response = fail_response(&ApiError::limit_exceeded("x"));
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
