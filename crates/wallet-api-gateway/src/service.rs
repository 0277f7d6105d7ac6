//! Wallet gateway service: listeners, router and shutdown.
//!
//! Two listeners share one registry:
//! - the JSON API (`POST /<endpoint>`), behind the middleware stack;
//! - the admin API (`GET /health`, `GET /endpoints`, `GET /metrics`).

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::Method,
    response::Response,
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tracing::{error, info, warn};

use crate::domain::config::GatewayConfig;
use crate::domain::envelope::{envelope_response, fail_response};
use crate::domain::error::{ApiError, ApiResult, GatewayError};
use crate::middleware::{BodyLimitLayer, LatencyLayer, LatencyRecorder, TracingLayer};
use crate::registry::EndpointRegistry;

pub struct WalletGatewayService {
    config: GatewayConfig,
    registry: Arc<EndpointRegistry>,
    latency: Arc<LatencyRecorder>,
}

impl WalletGatewayService {
    pub fn new(config: GatewayConfig, registry: EndpointRegistry) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            registry: Arc::new(registry),
            latency: Arc::new(LatencyRecorder::new()),
        })
    }

    pub fn registry(&self) -> Arc<EndpointRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn latency(&self) -> Arc<LatencyRecorder> {
        Arc::clone(&self.latency)
    }

    /// JSON API router with the full middleware stack.
    pub fn http_router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TracingLayer::new())
            .layer(BodyLimitLayer::new(self.config.limits.clone()))
            .layer(LatencyLayer::new(
                Arc::clone(&self.registry),
                Arc::clone(&self.latency),
            ));

        Router::new()
            .fallback(dispatch)
            .layer(middleware)
            .with_state(Arc::clone(&self.registry))
    }

    pub fn admin_router(&self) -> Router {
        let registry = Arc::clone(&self.registry);
        let latency = Arc::clone(&self.latency);

        let router = Router::new()
            .route(
                "/health",
                get({
                    let registry = Arc::clone(&registry);
                    move || async move {
                        Json(json!({
                            "status": "ok",
                            "mode": registry.mode().as_str(),
                            "endpoints": registry.len(),
                        }))
                    }
                }),
            )
            .route(
                "/endpoints",
                get(move || async move { Json(describe_endpoints(&registry)) }),
            )
            .route(
                "/metrics",
                get({
                    let latency = Arc::clone(&latency);
                    move || async move { Json(latency.to_json()) }
                }),
            );

        #[cfg(feature = "metrics")]
        let router = router.route(
            "/metrics/prometheus",
            get(move || async move { latency.to_prometheus() }),
        );

        router
    }

    /// Serve until Ctrl-C.
    pub async fn start(&self) -> Result<(), GatewayError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
            }
        })
        .await
    }

    /// Serve until `signal` resolves, then give in-flight requests
    /// `shutdown_grace` to finish.
    pub async fn run_until<F>(&self, signal: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut servers: Vec<(&'static str, JoinHandle<std::io::Result<()>>)> = Vec::new();

        if self.config.http.enabled {
            let addr = self.config.http_addr();
            let listener = bind(addr).await?;
            info!(addr = %addr, mode = self.registry.mode().as_str(), "Starting HTTP server");
            servers.push(("http", serve(listener, self.http_router(), shutdown_rx.clone())));
        }

        if self.config.admin.enabled {
            let addr = self.config.admin_addr();
            let listener = bind(addr).await?;
            info!(addr = %addr, "Starting Admin server");
            servers.push(("admin", serve(listener, self.admin_router(), shutdown_rx.clone())));
        }

        if servers.is_empty() {
            warn!("No listeners enabled; nothing to serve");
            return Ok(());
        }

        info!("Wallet gateway started");
        signal.await;
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);

        let deadline = tokio::time::Instant::now() + self.config.shutdown_grace;
        for (name, mut handle) in servers {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(e))) => error!(server = name, error = %e, "Server error"),
                Ok(Err(e)) => error!(server = name, error = %e, "Server task failed"),
                Err(_) => {
                    warn!(server = name, "Shutdown grace period elapsed; aborting");
                    handle.abort();
                }
            }
        }

        info!("Wallet gateway stopped");
        Ok(())
    }
}

async fn bind(addr: std::net::SocketAddr) -> Result<TcpListener, GatewayError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
}

fn serve(
    listener: TcpListener,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.wait_for(|stop| *stop).await;
            })
            .await
    })
}

/// Catalog metadata of every registered endpoint, sorted by name.
fn describe_endpoints(registry: &EndpointRegistry) -> Vec<Value> {
    registry
        .names()
        .into_iter()
        .filter_map(|name| registry.lookup(name))
        .map(|endpoint| {
            let info = endpoint.info();
            json!({
                "name": info.name,
                "category": info.category,
                "description": info.description,
                "requires_wallet": info.requires_wallet(),
            })
        })
        .collect()
}

/// Route a request to its endpoint and wrap the outcome in an envelope.
async fn dispatch(State(registry): State<Arc<EndpointRegistry>>, req: Request) -> Response {
    let path = req.uri().path().to_owned();

    if registry.lookup(&path).is_none() {
        return fail_response(&ApiError::not_found());
    }
    if req.method() != Method::POST {
        return fail_response(&ApiError::invalid_request(format!(
            "{} is not supported, use POST",
            req.method()
        )));
    }

    // The body limit layer has already buffered and bounded the body
    let bytes = match to_bytes(req.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return fail_response(&ApiError::invalid_request(e.to_string())),
    };
    let body = match parse_body(&bytes) {
        Ok(body) => body,
        Err(e) => return fail_response(&e),
    };

    envelope_response(registry.dispatch(&path, body).await)
}

/// Decode a request body. Empty means `{}`; anything else must be a JSON object.
pub fn parse_body(bytes: &[u8]) -> ApiResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(ApiError::invalid_request("request body must be a JSON object"));
    }
    Ok(value)
}
