// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Wallet API Gateway - JSON endpoint dispatch for a wallet-enabled node.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       WALLET API GATEWAY                            │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────┐                    ┌─────────────────┐         │
//! │  │   JSON API      │                    │     Admin       │         │
//! │  │   Port 9888     │                    │   Port 9889     │         │
//! │  └────────┬────────┘                    └────────┬────────┘         │
//! │           │                                      │                  │
//! │  ┌────────┴──────────────────────────┐   /health, /endpoints        │
//! │  │ Tracing → BodyLimit → Latency     │                              │
//! │  └────────┬──────────────────────────┘                              │
//! │           │                                                         │
//! │  ┌────────┴──────────────────────────┐                              │
//! │  │ EndpointRegistry                  │                              │
//! │  │ (WalletEnabled | ReadOnly)        │                              │
//! │  └────────┬──────────────────────────┘                              │
//! │           │                                                         │
//! │  ┌────────┴────────┐  ┌──────────────────────────┐                  │
//! │  │ Handlers        │──│ BalanceIndexer           │                  │
//! │  │                 │  │ UnspentOutputIndexer     │                  │
//! │  └────────┬────────┘  └──────────────────────────┘                  │
//! └───────────┼─────────────────────────────────────────────────────────┘
//!             │
//!     Accounts · Assets · Wallet · KeyStore · Chain · Network · Feeds
//! ```
//!
//! # Registry Modes
//!
//! - **WalletEnabled**: accounts and assets services are present; every
//!   catalog endpoint is served.
//! - **ReadOnly**: wallet endpoints are absent and answer with the NotFound
//!   envelope, exactly like an unknown path.
//!
//! # Usage
//!
//! ```ignore
//! use wallet_api_gateway::{GatewayConfig, MemoryNode, WalletGatewayService};
//!
//! let node = MemoryNode::demo();
//! let registry = node.registry_builder().build()?;
//! let service = WalletGatewayService::new(GatewayConfig::default(), registry)?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod indexer;
pub mod middleware;
pub mod ports;
pub mod registry;
pub mod service;

// Re-exports for public API
pub use adapters::MemoryNode;
pub use domain::config::GatewayConfig;
pub use domain::envelope::{Envelope, Status};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use domain::types::*;
pub use indexer::{BalanceIndexer, IndexError, UnspentOutputIndexer};
pub use middleware::LatencyRecorder;
pub use registry::{
    EndpointRegistry, NodeServices, RegistryBuilder, RegistryMode, RequestContext, WalletServices,
};
pub use service::WalletGatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
