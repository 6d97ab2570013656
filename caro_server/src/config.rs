//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Bind address used when neither `--bind` nor `SERVER_BIND` is given.
pub const DEFAULT_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 5000));

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus scrape address; metrics export is off when unset
    pub metrics_bind: Option<SocketAddr>,
    /// Per-connection WebSocket limits
    pub websocket: WebSocketConfig,
}

/// Per-connection WebSocket limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSocketConfig {
    /// Outbound events queued per session before delivery fails
    pub event_buffer: usize,
    /// Messages allowed per second
    pub burst_limit: usize,
    /// Messages allowed per minute
    pub sustained_limit: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            event_buffer: 64,
            burst_limit: 10,
            sustained_limit: 100,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND,
            metrics_bind: None,
            websocket: WebSocketConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_bind_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if an address variable is set but does not parse
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_bind_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => parse_addr_var("SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        let metrics_bind = match metrics_bind_override {
            Some(addr) => Some(addr),
            None => parse_addr_var("METRICS_BIND")?,
        };

        let defaults = WebSocketConfig::default();
        let websocket = WebSocketConfig {
            event_buffer: parse_env_or("WS_EVENT_BUFFER", defaults.event_buffer),
            burst_limit: parse_env_or("WS_BURST_LIMIT", defaults.burst_limit),
            sustained_limit: parse_env_or("WS_SUSTAINED_LIMIT", defaults.sustained_limit),
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            websocket,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.websocket.event_buffer == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_EVENT_BUFFER".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.websocket.burst_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "WS_BURST_LIMIT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.websocket.sustained_limit < self.websocket.burst_limit {
            return Err(ConfigError::Invalid {
                var: "WS_SUSTAINED_LIMIT".to_string(),
                reason: format!(
                    "Must be at least the burst limit ({})",
                    self.websocket.burst_limit
                ),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read an optional socket address, rejecting values that do not parse
fn parse_addr_var(key: &str) -> Result<Option<SocketAddr>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("{value:?} is not an IP:PORT address ({e})"),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "WS_BURST_LIMIT".to_string(),
            reason: "Must be greater than 0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("WS_BURST_LIMIT"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.bind.port(), 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_win() {
        let bind: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let metrics: SocketAddr = "0.0.0.0:9090".parse().unwrap();
        let config = ServerConfig::from_env(Some(bind), Some(metrics)).unwrap();
        assert_eq!(config.bind, bind);
        assert_eq!(config.metrics_bind, Some(metrics));
    }

    #[test]
    fn test_config_validation_zero_buffer() {
        let config = ServerConfig {
            websocket: WebSocketConfig {
                event_buffer: 0, // Invalid
                ..WebSocketConfig::default()
            },
            ..ServerConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "WS_EVENT_BUFFER"));
    }

    #[test]
    fn test_config_validation_sustained_below_burst() {
        let config = ServerConfig {
            websocket: WebSocketConfig {
                burst_limit: 20,
                sustained_limit: 10, // Invalid: less than burst
                ..WebSocketConfig::default()
            },
            ..ServerConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "WS_SUSTAINED_LIMIT"));
    }

    #[test]
    fn test_config_validation_metrics_on_server_port() {
        let config = ServerConfig {
            metrics_bind: Some(ServerConfig::default().bind),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_or_falls_back() {
        assert_eq!(parse_env_or("CARO_SERVER_TEST_UNSET_VARIABLE", 42usize), 42);
        assert_eq!(parse_addr_var("CARO_SERVER_TEST_UNSET_VARIABLE").unwrap(), None);
    }
}
