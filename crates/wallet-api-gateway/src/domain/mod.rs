//! Domain types for the wallet gateway.
//!
//! Configuration, the endpoint catalog, errors, the response envelope and the
//! wire types. No I/O lives here.

pub mod config;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod types;

pub use config::{ConfigError, GatewayConfig, LimitsConfig};
pub use endpoints::{catalog, endpoint_info, Availability, EndpointCategory, EndpointInfo};
pub use envelope::{Envelope, Status};
pub use error::{ApiError, ApiResult, GatewayError};
pub use types::*;
