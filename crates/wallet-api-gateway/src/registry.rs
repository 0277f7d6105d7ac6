//! Endpoint registry: the immutable path → handler table.
//!
//! The table is built once at startup from the capabilities that are present.
//! Both accounts and assets services present gives [`RegistryMode::WalletEnabled`];
//! anything less gives [`RegistryMode::ReadOnly`], where wallet endpoints are
//! simply absent and fall through to the NotFound envelope.
//!
//! Every handler has the same shape, `(RequestContext, Value) -> ApiResult<Value>`;
//! [`json_handler`] adapts typed async functions to it with serde.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::endpoints::{catalog, endpoint_info, Availability, EndpointInfo};
use crate::domain::error::{ApiError, ApiResult, GatewayError};
use crate::handlers;
use crate::ports::{
    AccountsService, AssetsService, ChainService, KeyStore, NetworkService, TransactionService,
    TxFeedService, WalletService,
};

/// Per-request context handed to every handler.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub endpoint: &'static str,
    pub received_at: Instant,
}

impl RequestContext {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            endpoint,
            received_at: Instant::now(),
        }
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = ApiResult<Value>> + Send>>;

/// Normalized handler shape.
pub type Handler = Arc<dyn Fn(RequestContext, Value) -> HandlerFuture + Send + Sync>;

/// Adapt a typed async handler to the normalized [`Handler`] shape.
///
/// The body is decoded into `Req` before the handler runs; a body that does not
/// fit becomes an invalid-params failure and the handler is never called.
pub fn json_handler<Req, Resp, F, Fut>(f: F) -> Handler
where
    Req: DeserializeOwned + Send + 'static,
    Resp: Serialize + Send + 'static,
    F: Fn(RequestContext, Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<Resp>> + Send + 'static,
{
    Arc::new(move |ctx: RequestContext, body: Value| -> HandlerFuture {
        let req: Req = match serde_json::from_value(body) {
            Ok(req) => req,
            Err(e) => {
                return Box::pin(futures::future::ready(Err(ApiError::invalid_params(
                    e.to_string(),
                ))))
            }
        };
        let fut = f(ctx, req);
        Box::pin(async move {
            let resp = fut.await?;
            serde_json::to_value(resp).map_err(|e| ApiError::internal(e.to_string()))
        })
    })
}

/// One registered endpoint.
#[derive(Clone)]
pub struct Endpoint {
    info: &'static EndpointInfo,
    handler: Handler,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        self.info.name
    }

    pub fn info(&self) -> &'static EndpointInfo {
        self.info
    }

    pub async fn call(&self, ctx: RequestContext, body: Value) -> ApiResult<Value> {
        (self.handler)(ctx, body).await
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint").field("name", &self.info.name).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CAPABILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Collaborators every node has.
#[derive(Clone)]
pub struct NodeServices {
    pub chain: Arc<dyn ChainService>,
    pub network: Arc<dyn NetworkService>,
    pub transactions: Arc<dyn TransactionService>,
    pub feeds: Arc<dyn TxFeedService>,
}

/// Collaborators behind the wallet endpoints.
#[derive(Clone)]
pub struct WalletServices {
    pub accounts: Arc<dyn AccountsService>,
    pub assets: Arc<dyn AssetsService>,
    pub wallet: Arc<dyn WalletService>,
    pub keys: Arc<dyn KeyStore>,
}

/// Outcome of the startup capability check.
#[derive(Clone)]
pub enum Capabilities {
    WalletEnabled(WalletServices),
    ReadOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryMode {
    WalletEnabled,
    ReadOnly,
}

impl RegistryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryMode::WalletEnabled => "wallet-enabled",
            RegistryMode::ReadOnly => "read-only",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// BUILDER
// ═══════════════════════════════════════════════════════════════════════════

/// Collects capabilities and builds the registry once.
pub struct RegistryBuilder {
    node: NodeServices,
    accounts: Option<Arc<dyn AccountsService>>,
    assets: Option<Arc<dyn AssetsService>>,
    wallet: Option<Arc<dyn WalletService>>,
    keys: Option<Arc<dyn KeyStore>>,
}

impl RegistryBuilder {
    pub fn new(node: NodeServices) -> Self {
        Self {
            node,
            accounts: None,
            assets: None,
            wallet: None,
            keys: None,
        }
    }

    pub fn with_accounts(mut self, accounts: Arc<dyn AccountsService>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    pub fn with_assets(mut self, assets: Arc<dyn AssetsService>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_wallet(mut self, wallet: Arc<dyn WalletService>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_keys(mut self, keys: Arc<dyn KeyStore>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Decide the registry variant.
    ///
    /// Accounts and assets decide the mode. Once they are present the wallet
    /// service and key store are required too.
    pub fn capabilities(&self) -> Result<Capabilities, GatewayError> {
        let (Some(accounts), Some(assets)) = (&self.accounts, &self.assets) else {
            return Ok(Capabilities::ReadOnly);
        };

        let wallet = self.wallet.clone().ok_or_else(|| {
            GatewayError::Registration("wallet-enabled registry requires a wallet service".into())
        })?;
        let keys = self.keys.clone().ok_or_else(|| {
            GatewayError::Registration("wallet-enabled registry requires a key store".into())
        })?;

        Ok(Capabilities::WalletEnabled(WalletServices {
            accounts: Arc::clone(accounts),
            assets: Arc::clone(assets),
            wallet,
            keys,
        }))
    }

    pub fn build(self) -> Result<EndpointRegistry, GatewayError> {
        let capabilities = self.capabilities()?;

        let mode = match capabilities {
            Capabilities::WalletEnabled(_) => RegistryMode::WalletEnabled,
            Capabilities::ReadOnly => {
                warn!(
                    required = "accounts, assets",
                    "Wallet capabilities unavailable; wallet endpoints disabled"
                );
                RegistryMode::ReadOnly
            }
        };

        let mut table = EndpointTable::new(mode);
        handlers::register_node_endpoints(&mut table, &self.node)?;
        if let Capabilities::WalletEnabled(services) = &capabilities {
            handlers::register_wallet_endpoints(&mut table, services, &self.node)?;
        }
        let endpoints = table.finish()?;

        info!(mode = mode.as_str(), endpoints = endpoints.len(), "Endpoint registry built");
        Ok(EndpointRegistry { mode, endpoints })
    }
}

/// Mutable table used only while building.
pub struct EndpointTable {
    mode: RegistryMode,
    endpoints: HashMap<&'static str, Endpoint>,
}

impl EndpointTable {
    fn new(mode: RegistryMode) -> Self {
        Self {
            mode,
            endpoints: HashMap::new(),
        }
    }

    /// Bind a handler to a catalog path.
    pub fn bind(&mut self, name: &str, handler: Handler) -> Result<(), GatewayError> {
        let info = endpoint_info(name).ok_or_else(|| {
            GatewayError::Registration(format!("{name} is not in the endpoint catalog"))
        })?;

        if info.requires_wallet() && self.mode == RegistryMode::ReadOnly {
            return Err(GatewayError::Registration(format!(
                "{name} requires wallet capabilities"
            )));
        }

        if self.endpoints.contains_key(info.name) {
            return Err(GatewayError::Registration(format!(
                "{name} registered twice"
            )));
        }

        self.endpoints.insert(info.name, Endpoint { info, handler });
        Ok(())
    }

    /// Every catalog entry available in this mode must have a handler.
    fn finish(self) -> Result<HashMap<&'static str, Endpoint>, GatewayError> {
        let missing: Vec<_> = catalog()
            .iter()
            .filter(|info| {
                self.mode == RegistryMode::WalletEnabled
                    || info.availability == Availability::Always
            })
            .filter(|info| !self.endpoints.contains_key(info.name))
            .map(|info| info.name)
            .collect();

        if !missing.is_empty() {
            return Err(GatewayError::Registration(format!(
                "no handler for {}",
                missing.join(", ")
            )));
        }

        Ok(self.endpoints)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════

/// Immutable endpoint table, shared read-only across requests.
pub struct EndpointRegistry {
    mode: RegistryMode,
    endpoints: HashMap<&'static str, Endpoint>,
}

impl EndpointRegistry {
    pub fn mode(&self) -> RegistryMode {
        self.mode
    }

    /// Look up by request path; a leading `/` is ignored.
    pub fn lookup(&self, path: &str) -> Option<&Endpoint> {
        self.endpoints.get(path.strip_prefix('/').unwrap_or(path))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.endpoints.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Route and run a request. Unknown paths get the fixed NotFound failure,
    /// and a panicking handler becomes an internal error.
    pub async fn dispatch(&self, path: &str, body: Value) -> ApiResult<Value> {
        let endpoint = self.lookup(path).ok_or_else(ApiError::not_found)?;
        let ctx = RequestContext::new(endpoint.name());

        match AssertUnwindSafe(endpoint.call(ctx, body)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(endpoint = endpoint.name(), "Handler panicked");
                Err(ApiError::internal(format!("{} handler panicked", endpoint.name())))
            }
        }
    }
}
