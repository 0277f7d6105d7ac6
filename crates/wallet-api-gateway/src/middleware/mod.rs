//! Middleware stack.
//!
//! Order, outermost first: tracing, body limit, latency, dispatch.

pub mod body_limit;
pub mod latency;
pub mod tracing;

pub use body_limit::BodyLimitLayer;
pub use latency::{LatencyLayer, LatencyRecorder, RouteStats};
pub use self::tracing::TracingLayer;
