//! Gateway configuration with validation.
//!
//! Loaded from a TOML file, then overridden from the environment:
//!
//! ```toml
//! shutdown_grace = "5s"
//!
//! [http]
//! host = "127.0.0.1"
//! port = 9888
//!
//! [admin]
//! port = 9889
//!
//! [limits]
//! max_request_size = 10485760
//!
//! [wallet]
//! enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Longest accepted `shutdown_grace`.
pub const MAX_SHUTDOWN_GRACE: Duration = Duration::from_secs(3600);

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// JSON API listener
    pub http: HttpConfig,
    /// Health and metrics listener (localhost only by default)
    pub admin: AdminConfig,
    /// Request limits
    pub limits: LimitsConfig,
    /// Wallet capability switch
    pub wallet: WalletConfig,
    /// Time allowed for in-flight requests after Ctrl-C
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            admin: AdminConfig::default(),
            limits: LimitsConfig::default(),
            wallet: WalletConfig::default(),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `WALLET_RPC_PORT`, `WALLET_ADMIN_PORT` and `WALLET_DISABLE`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("WALLET_RPC_PORT") {
            match port.parse() {
                Ok(p) => {
                    self.http.port = p;
                    info!(port = p, "RPC port overridden from environment");
                }
                Err(_) => warn!(value = %port, "WALLET_RPC_PORT is not a valid port"),
            }
        }
        if let Some(port) = lookup("WALLET_ADMIN_PORT") {
            match port.parse() {
                Ok(p) => self.admin.port = p,
                Err(_) => warn!(value = %port, "WALLET_ADMIN_PORT is not a valid port"),
            }
        }
        if let Some(flag) = lookup("WALLET_DISABLE") {
            if matches!(flag.as_str(), "1" | "true" | "yes") {
                self.wallet.enabled = false;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.enabled && self.admin.enabled && self.http.port == self.admin.port {
            return Err(ConfigError::DuplicatePorts);
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        if self.shutdown_grace > MAX_SHUTDOWN_GRACE {
            return Err(ConfigError::InvalidLimit(format!(
                "shutdown_grace cannot exceed {}s",
                MAX_SHUTDOWN_GRACE.as_secs()
            )));
        }

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Get Admin server bind address
    pub fn admin_addr(&self) -> SocketAddr {
        SocketAddr::new(self.admin.host, self.admin.port)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 9888)
    pub port: u16,
    /// Enable HTTP server
    pub enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 9888,
            enabled: true,
        }
    }
}

/// Admin server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub host: IpAddr,
    /// Port (default: 9889)
    pub port: u16,
    pub enabled: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 9889,
            enabled: true,
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 10MB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 10 * 1024 * 1024,
        }
    }
}

/// Wallet capability configuration.
///
/// When disabled the node starts with the read-only endpoint table even if
/// wallet services are available.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub enabled: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// HTTP and admin listeners share a port
    #[error("http and admin ports must be different")]
    DuplicatePorts,
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}

/// Humantime serde module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() != 0 {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        } else {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, &'static str> {
        let s = s.trim();
        // "ms" before "s" and "m"
        if let Some(ms) = s.strip_suffix("ms") {
            ms.trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| "invalid milliseconds")
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid seconds")
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim()
                .parse::<u64>()
                .map_err(|_| "invalid minutes")?
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or("minutes out of range")
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| "invalid duration format")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http.port, 9888);
        assert_eq!(config.admin.port, 9889);
        assert!(config.wallet.enabled);
    }

    #[test]
    fn test_duplicate_ports() {
        let mut config = GatewayConfig::default();
        config.admin.port = config.http.port;
        assert!(matches!(config.validate(), Err(ConfigError::DuplicatePorts)));
    }

    #[test]
    fn test_zero_request_size() {
        let mut config = GatewayConfig::default();
        config.limits.max_request_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_parse_toml() {
        let config = GatewayConfig::parse(
            r#"
            shutdown_grace = "250ms"

            [http]
            port = 7000

            [limits]
            max_request_size = 2048

            [wallet]
            enabled = false
            "#,
        )
        .unwrap();
        assert_eq!(config.http.port, 7000);
        assert_eq!(config.admin.port, 9889);
        assert_eq!(config.limits.max_request_size, 2048);
        assert!(!config.wallet.enabled);
        assert_eq!(config.shutdown_grace, Duration::from_millis(250));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            GatewayConfig::parse("[http\nport ="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(&path, "[admin]\nenabled = false\n").unwrap();

        let config = GatewayConfig::load(&path).unwrap();
        assert!(!config.admin.enabled);

        let missing = GatewayConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WALLET_RPC_PORT", "7100"),
            ("WALLET_ADMIN_PORT", "not-a-port"),
            ("WALLET_DISABLE", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = GatewayConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.http.port, 7100);
        assert_eq!(config.admin.port, 9889);
        assert!(!config.wallet.enabled);
    }

    #[test]
    fn test_duration_formats() {
        assert_eq!(
            humantime_serde::parse_duration("2m").unwrap(),
            Duration::from_secs(120)
        );
        assert_eq!(
            humantime_serde::parse_duration("15").unwrap(),
            Duration::from_secs(15)
        );
        assert!(humantime_serde::parse_duration("soon").is_err());
    }

    #[test]
    fn test_huge_minutes_rejected() {
        let huge = format!("{}m", u64::MAX);
        assert_eq!(
            humantime_serde::parse_duration(&huge),
            Err("minutes out of range")
        );
        let largest = format!("{}m", u64::MAX / 60);
        assert!(humantime_serde::parse_duration(&largest).is_ok());

        // Parses, but the service would never finish shutting down
        let config = GatewayConfig::parse(&format!("shutdown_grace = \"{largest}\"")).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
    }

    #[test]
    fn test_huge_minutes_fail_config_parse() {
        let toml = format!("shutdown_grace = \"{}m\"", u64::MAX);
        assert!(GatewayConfig::parse(&toml).is_err());
    }
}
