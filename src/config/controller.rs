//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use std::time::Duration;

use crate::errors::{new_operator_error, ErrorContext, ErrorKind, OperatorError};

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Environment variables are populated from a ConfigMap using `envFrom` in the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// HTTP server port for `/metrics`, `/healthz` and `/readyz`
    pub metrics_port: u16,
    /// Namespace to watch
    /// `None` watches MCPServers in all namespaces
    pub watch_namespace: Option<String>,
    /// Requeue delay after a converged pass (seconds)
    /// This is the periodic resync that re-checks readiness
    pub resync_interval_secs: u64,
    /// Delay before the pass that follows a defaulting write (milliseconds)
    pub requeue_now_delay_ms: u64,
    /// First error backoff (seconds)
    pub backoff_min_secs: u64,
    /// Maximum error backoff (seconds)
    pub backoff_max_secs: u64,
    /// Maximum concurrent reconciliations
    /// Passes for the same MCPServer are always serialized by the controller
    pub max_concurrent_reconciliations: u16,
    /// How long to wait for the HTTP server to accept connections at startup (seconds)
    pub server_startup_timeout_secs: u64,
    /// Poll interval while waiting for the HTTP server (milliseconds)
    pub server_poll_interval_ms: u64,
    /// Log format (text, json)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;

        Self {
            metrics_port: DEFAULT_METRICS_PORT,
            watch_namespace: None,
            resync_interval_secs: DEFAULT_RESYNC_INTERVAL_SECS,
            requeue_now_delay_ms: DEFAULT_REQUEUE_NOW_DELAY_MS,
            backoff_min_secs: DEFAULT_BACKOFF_MIN_SECS,
            backoff_max_secs: DEFAULT_BACKOFF_MAX_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            server_startup_timeout_secs: DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            server_poll_interval_ms: DEFAULT_SERVER_POLL_INTERVAL_MS,
            log_format: "text".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        use crate::constants::*;

        Self {
            metrics_port: env_var_or_default("METRICS_PORT", DEFAULT_METRICS_PORT),
            watch_namespace: std::env::var("WATCH_NAMESPACE")
                .ok()
                .filter(|ns| !ns.trim().is_empty()),
            resync_interval_secs: env_var_or_default(
                "RESYNC_INTERVAL_SECS",
                DEFAULT_RESYNC_INTERVAL_SECS,
            ),
            requeue_now_delay_ms: env_var_or_default(
                "REQUEUE_NOW_DELAY_MS",
                DEFAULT_REQUEUE_NOW_DELAY_MS,
            ),
            backoff_min_secs: env_var_or_default("BACKOFF_MIN_SECS", DEFAULT_BACKOFF_MIN_SECS),
            backoff_max_secs: env_var_or_default("BACKOFF_MAX_SECS", DEFAULT_BACKOFF_MAX_SECS),
            max_concurrent_reconciliations: env_var_or_default(
                "MAX_CONCURRENT_RECONCILIATIONS",
                DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            ),
            server_startup_timeout_secs: env_var_or_default(
                "SERVER_STARTUP_TIMEOUT_SECS",
                DEFAULT_SERVER_STARTUP_TIMEOUT_SECS,
            ),
            server_poll_interval_ms: env_var_or_default(
                "SERVER_POLL_INTERVAL_MS",
                DEFAULT_SERVER_POLL_INTERVAL_MS,
            ),
            log_format: env_var_or_default_str("LOG_FORMAT", "text"),
        }
    }

    /// Reject settings the controller cannot run with
    ///
    /// # Errors
    ///
    /// Returns a configuration-category [`OperatorError`] naming the offending setting.
    pub fn validate(&self) -> Result<(), OperatorError> {
        let invalid = |setting: &str, message: String| {
            new_operator_error(ErrorKind::InvalidConfig, message, ErrorContext::new())
                .with_context("setting", setting)
        };

        if self.backoff_min_secs == 0 {
            return Err(invalid(
                "BACKOFF_MIN_SECS",
                "BACKOFF_MIN_SECS must be greater than zero".to_string(),
            ));
        }
        if self.backoff_max_secs < self.backoff_min_secs {
            return Err(invalid(
                "BACKOFF_MAX_SECS",
                format!(
                    "BACKOFF_MAX_SECS ({}) must not be below BACKOFF_MIN_SECS ({})",
                    self.backoff_max_secs, self.backoff_min_secs
                ),
            ));
        }
        if self.max_concurrent_reconciliations == 0 {
            return Err(invalid(
                "MAX_CONCURRENT_RECONCILIATIONS",
                "MAX_CONCURRENT_RECONCILIATIONS must be greater than zero".to_string(),
            ));
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(invalid(
                "LOG_FORMAT",
                format!("LOG_FORMAT must be 'text' or 'json', got '{}'", self.log_format),
            ));
        }
        Ok(())
    }

    /// Get resync interval duration
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Get delay used for an immediate requeue
    #[must_use]
    pub fn requeue_now_delay(&self) -> Duration {
        Duration::from_millis(self.requeue_now_delay_ms)
    }

    /// Get server startup timeout duration
    #[must_use]
    pub fn server_startup_timeout(&self) -> Duration {
        Duration::from_secs(self.server_startup_timeout_secs)
    }

    /// Get server readiness poll interval
    #[must_use]
    pub fn server_poll_interval(&self) -> Duration {
        Duration::from_millis(self.server_poll_interval_ms)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resync_interval(), Duration::from_secs(300));
        assert_eq!(config.requeue_now_delay(), Duration::ZERO);
        assert_eq!(config.metrics_port, 8080);
        assert!(config.watch_namespace.is_none());
    }

    #[test]
    fn test_backoff_bounds_are_checked() {
        let config = ControllerConfig {
            backoff_min_secs: 30,
            backoff_max_secs: 10,
            ..ControllerConfig::default()
        };
        let err = config.validate().expect_err("max below min must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        assert_eq!(err.code(), "79000");
        assert_eq!(
            err.context().get("setting").map(String::as_str),
            Some("BACKOFF_MAX_SECS")
        );
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let config = ControllerConfig {
            max_concurrent_reconciliations: 0,
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let config = ControllerConfig {
            log_format: "xml".to_string(),
            ..ControllerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
