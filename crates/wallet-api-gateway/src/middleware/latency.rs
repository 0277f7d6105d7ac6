//! Per-route latency recording.
//!
//! Only requests that match a registered endpoint are recorded, keyed by the
//! endpoint name. Unknown paths and rejected bodies leave no trace here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{body::Body, http::Request, response::Response};
use dashmap::DashMap;
use serde_json::{json, Value};
use tower::{Layer, Service};

use crate::registry::EndpointRegistry;

/// Counters for one route.
#[derive(Debug, Default)]
pub struct RouteStats {
    pub count: AtomicU64,
    pub failures: AtomicU64,
    pub total_us: AtomicU64,
    pub max_us: AtomicU64,
}

impl RouteStats {
    pub fn average_us(&self) -> f64 {
        let count = self.count.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            self.total_us.load(Ordering::Relaxed) as f64 / count as f64
        }
    }
}

/// Latency recorder shared between the dispatch stack and the admin listener.
#[derive(Debug, Default)]
pub struct LatencyRecorder {
    routes: DashMap<&'static str, RouteStats>,
}

impl LatencyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, route: &'static str, elapsed: Duration, success: bool) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let stats = self.routes.entry(route).or_default();

        stats.count.fetch_add(1, Ordering::Relaxed);
        if !success {
            stats.failures.fetch_add(1, Ordering::Relaxed);
        }
        stats.total_us.fetch_add(micros, Ordering::Relaxed);
        stats.max_us.fetch_max(micros, Ordering::Relaxed);
    }

    /// Number of recorded requests for `route`.
    pub fn count(&self, route: &str) -> u64 {
        self.routes
            .get(route)
            .map_or(0, |s| s.count.load(Ordering::Relaxed))
    }

    pub fn routes(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.routes.iter().map(|e| *e.key()).collect();
        names.sort_unstable();
        names
    }

    pub fn to_json(&self) -> Value {
        let routes: serde_json::Map<String, Value> = self
            .routes()
            .into_iter()
            .filter_map(|name| {
                let stats = self.routes.get(name)?;
                Some((
                    name.to_string(),
                    json!({
                        "count": stats.count.load(Ordering::Relaxed),
                        "failures": stats.failures.load(Ordering::Relaxed),
                        "avg_us": stats.average_us(),
                        "max_us": stats.max_us.load(Ordering::Relaxed),
                    }),
                ))
            })
            .collect();

        json!({ "routes": routes })
    }

    /// Export in Prometheus text format
    #[cfg(feature = "metrics")]
    pub fn to_prometheus(&self) -> String {
        let mut output = String::from(
            "# HELP wallet_api_requests_total Requests per endpoint\n\
             # TYPE wallet_api_requests_total counter\n",
        );
        let routes = self.routes();
        for name in &routes {
            if let Some(stats) = self.routes.get(name) {
                output.push_str(&format!(
                    "wallet_api_requests_total{{endpoint=\"{name}\"}} {}\n",
                    stats.count.load(Ordering::Relaxed)
                ));
            }
        }

        output.push_str(
            "# HELP wallet_api_request_failures_total Failed requests per endpoint\n\
             # TYPE wallet_api_request_failures_total counter\n",
        );
        for name in &routes {
            if let Some(stats) = self.routes.get(name) {
                output.push_str(&format!(
                    "wallet_api_request_failures_total{{endpoint=\"{name}\"}} {}\n",
                    stats.failures.load(Ordering::Relaxed)
                ));
            }
        }

        output.push_str(
            "# HELP wallet_api_request_duration_max_us Slowest request per endpoint\n\
             # TYPE wallet_api_request_duration_max_us gauge\n",
        );
        for name in &routes {
            if let Some(stats) = self.routes.get(name) {
                output.push_str(&format!(
                    "wallet_api_request_duration_max_us{{endpoint=\"{name}\"}} {}\n",
                    stats.max_us.load(Ordering::Relaxed)
                ));
            }
        }

        output
    }
}

#[derive(Clone)]
pub struct LatencyLayer {
    registry: Arc<EndpointRegistry>,
    recorder: Arc<LatencyRecorder>,
}

impl LatencyLayer {
    pub fn new(registry: Arc<EndpointRegistry>, recorder: Arc<LatencyRecorder>) -> Self {
        Self { registry, recorder }
    }
}

impl<S> Layer<S> for LatencyLayer {
    type Service = LatencyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LatencyService {
            inner,
            registry: Arc::clone(&self.registry),
            recorder: Arc::clone(&self.recorder),
        }
    }
}

#[derive(Clone)]
pub struct LatencyService<S> {
    inner: S,
    registry: Arc<EndpointRegistry>,
    recorder: Arc<LatencyRecorder>,
}

impl<S> Service<Request<Body>> for LatencyService<S>
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
        let route = self
            .registry
            .lookup(req.uri().path())
            .map(|endpoint| endpoint.name());
        let recorder = Arc::clone(&self.recorder);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let start = Instant::now();
            let result = inner.call(req).await;

            if let (Some(route), Ok(response)) = (route, &result) {
                recorder.record(route, start.elapsed(), response.status().is_success());
            }
            result
        })
    }
}
