//! Request body size limit.
//!
//! Runs before routing, so an oversized request is rejected whatever its
//! path and never reaches a handler or collaborator.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
};
use tower::{Layer, Service};
use tracing::warn;

use crate::domain::envelope::fail_response;
use crate::domain::error::ApiError;
use crate::domain::LimitsConfig;

#[derive(Clone)]
pub struct BodyLimitLayer {
    config: Arc<LimitsConfig>,
}

impl BodyLimitLayer {
    pub fn new(config: LimitsConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl<S> Layer<S> for BodyLimitLayer {
    type Service = BodyLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BodyLimitService {
            inner,
            config: Arc::clone(&self.config),
        }
    }
}

#[derive(Clone)]
pub struct BodyLimitService<S> {
    inner: S,
    config: Arc<LimitsConfig>,
}

impl<S> Service<Request<Body>> for BodyLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let max = self.config.max_request_size;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            // Fast path on the declared length
            if let Some(len) = declared_length(&req) {
                if len > max {
                    warn!(
                        size = len,
                        max,
                        path = %req.uri().path(),
                        "Request too large (from header)"
                    );
                    return Ok(too_large(max));
                }
            }

            // Chunked or undeclared bodies are read up to the limit
            let (parts, body) = req.into_parts();
            let bytes = match to_bytes(body, max).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, max, path = %parts.uri.path(), "Request body rejected");
                    return Ok(too_large(max));
                }
            };

            inner.call(Request::from_parts(parts, Body::from(bytes))).await
        })
    }
}

fn declared_length<B>(req: &Request<B>) -> Option<usize> {
    req.headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn too_large(max: usize) -> Response {
    fail_response(&ApiError::limit_exceeded(format!(
        "request body exceeds {max} bytes"
    )))
}
