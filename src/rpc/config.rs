//! Client configuration.
//!
//! A [`ClientConfig`] is fixed once a client is built: the address,
//! object name, retry budget and backoff ceiling never change for the
//! lifetime of that client.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::rpc::error::RpcError;

/// Default backoff ceiling in seconds.
pub const DEFAULT_MAX_SLEEP_SECS: f64 = 32.0;

/// Default retry count (negative retries forever).
pub const DEFAULT_RETRIES: i64 = -1;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "GOJSONRPC_CONFIG";

/// Server endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// How many connection attempts `connect` may make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryLimit {
    /// Keep trying until the server accepts.
    Unbounded,
    /// Give up once this many attempts have failed.
    Attempts(u64),
}

impl RetryLimit {
    /// Whether the failure of attempt number `attempt` (1-based) is final.
    pub fn is_exhausted(&self, attempt: u64) -> bool {
        match self {
            RetryLimit::Unbounded => false,
            RetryLimit::Attempts(max) => attempt >= (*max).max(1),
        }
    }
}

/// Configuration for an [`RpcClient`](crate::rpc::RpcClient).
///
/// # Example
///
/// ```
/// use gojsonrpc_client::rpc::ClientConfig;
///
/// let config = ClientConfig::new("127.0.0.1", 1234, "Arith")
///     .with_retries(5)
///     .with_max_sleep_time(8.0);
/// assert_eq!(config.method_path("Multiply"), "Arith.Multiply");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server endpoint.
    #[serde(flatten)]
    pub address: ServerAddress,
    /// Receiver name on the server, prepended to every method as `Object.Method`.
    pub object_name: String,
    /// Connection attempts before giving up; negative retries forever.
    #[serde(default = "default_retries")]
    pub retries: i64,
    /// Backoff ceiling in seconds.
    #[serde(default = "default_max_sleep_time")]
    pub max_sleep_time: f64,
    /// Optional per-response read timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<f64>,
}

fn default_retries() -> i64 {
    DEFAULT_RETRIES
}

fn default_max_sleep_time() -> f64 {
    DEFAULT_MAX_SLEEP_SECS
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, object_name: impl Into<String>) -> Self {
        Self {
            address: ServerAddress::new(host, port),
            object_name: object_name.into(),
            retries: DEFAULT_RETRIES,
            max_sleep_time: DEFAULT_MAX_SLEEP_SECS,
            read_timeout: None,
        }
    }

    pub fn with_retries(mut self, retries: i64) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_max_sleep_time(mut self, secs: f64) -> Self {
        self.max_sleep_time = secs;
        self
    }

    pub fn with_read_timeout(mut self, secs: Option<f64>) -> Self {
        self.read_timeout = secs;
        self
    }

    /// Load a JSON config file.
    ///
    /// ```json
    /// {"host": "127.0.0.1", "port": 1234, "object_name": "Arith", "retries": 3}
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a client cannot work with.
    pub fn validate(&self) -> Result<(), RpcError> {
        if self.address.host.trim().is_empty() {
            return Err(RpcError::Config("host must not be empty".to_string()));
        }
        if self.object_name.is_empty() {
            return Err(RpcError::Config("object_name must not be empty".to_string()));
        }
        secs_to_duration("max_sleep_time", self.max_sleep_time)?;
        if let Some(secs) = self.read_timeout {
            secs_to_duration("read_timeout", secs)?;
        }
        Ok(())
    }

    /// Typed view of `retries`.
    pub fn retry_limit(&self) -> RetryLimit {
        if self.retries < 0 {
            RetryLimit::Unbounded
        } else {
            RetryLimit::Attempts(self.retries as u64)
        }
    }

    /// Backoff ceiling. Unrepresentable values saturate; `validate` rejects them first.
    pub fn max_sleep(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_sleep_time).unwrap_or(Duration::MAX)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Fully qualified remote method name.
    pub fn method_path(&self, method: &str) -> String {
        format!("{}.{}", self.object_name, method)
    }
}

fn secs_to_duration(field: &str, secs: f64) -> Result<Duration, RpcError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(RpcError::Config(format!(
            "{} must be a finite, non-negative number of seconds (got {})",
            field, secs
        )));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| RpcError::Config(format!("{} is out of range: {}", field, e)))
}

/// Resolve the default config file location.
///
/// Resolution order:
/// 1. `$GOJSONRPC_CONFIG`
/// 2. `<config_dir>/gojsonrpc/client.json` (`~/.config` on Linux,
///    `~/Library/Application Support` on macOS)
/// 3. `/tmp/gojsonrpc/client.json` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("gojsonrpc").join("client.json");
    }

    PathBuf::from("/tmp/gojsonrpc/client.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("localhost", 1234, "Arith");
        assert_eq!(config.retries, -1);
        assert_eq!(config.max_sleep(), Duration::from_secs(32));
        assert_eq!(config.retry_limit(), RetryLimit::Unbounded);
        assert!(config.read_timeout().is_none());
        assert_eq!(config.address.to_string(), "localhost:1234");
    }

    #[test]
    fn test_method_path_prefixes_object_name() {
        let config = ClientConfig::new("localhost", 1234, "Arith");
        assert_eq!(config.method_path("Multiply"), "Arith.Multiply");
    }

    #[test]
    fn test_retry_limit_boundaries() {
        let three = ClientConfig::new("h", 1, "O").with_retries(3).retry_limit();
        assert_eq!(three, RetryLimit::Attempts(3));
        assert!(!three.is_exhausted(1));
        assert!(!three.is_exhausted(2));
        assert!(three.is_exhausted(3));

        // Zero still makes one attempt.
        let zero = ClientConfig::new("h", 1, "O").with_retries(0).retry_limit();
        assert!(zero.is_exhausted(1));

        let forever = ClientConfig::new("h", 1, "O").with_retries(-5).retry_limit();
        assert!(!forever.is_exhausted(u64::MAX));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let ok = ClientConfig::new("localhost", 1234, "Arith");
        assert!(ok.validate().is_ok());

        let empty_host = ClientConfig::new("  ", 1234, "Arith");
        assert!(matches!(empty_host.validate(), Err(RpcError::Config(_))));

        let empty_object = ClientConfig::new("localhost", 1234, "");
        assert!(matches!(empty_object.validate(), Err(RpcError::Config(_))));

        let negative = ok.clone().with_max_sleep_time(-1.0);
        assert!(matches!(negative.validate(), Err(RpcError::Config(_))));

        let nan_timeout = ok.clone().with_read_timeout(Some(f64::NAN));
        assert!(matches!(nan_timeout.validate(), Err(RpcError::Config(_))));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"host": "10.0.0.1", "port": 4000, "object_name": "Kv"}"#)
                .unwrap();
        assert_eq!(config, ClientConfig::new("10.0.0.1", 4000, "Kv"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "gojsonrpc-config-test-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"{"host": "127.0.0.1", "port": 9, "object_name": "Arith", "retries": 3, "max_sleep_time": 4.0, "read_timeout": 2.5}"#,
        )
        .unwrap();

        let config = ClientConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(config.retry_limit(), RetryLimit::Attempts(3));
        assert_eq!(config.max_sleep(), Duration::from_secs(4));
        assert_eq!(config.read_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = ClientConfig::load(Path::new("/nonexistent/gojsonrpc.json")).unwrap_err();
        assert!(
            err.to_string().contains("Failed to read config file"),
            "Unexpected error: {}",
            err
        );
    }

    /// Serializes tests that touch process environment variables.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_default_config_path_format() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::env::var_os(CONFIG_ENV_VAR);

        std::env::set_var(CONFIG_ENV_VAR, "/tmp/custom-gojsonrpc.json");
        let from_env = default_config_path();

        std::env::remove_var(CONFIG_ENV_VAR);
        let fallback = default_config_path();

        match previous {
            Some(value) => std::env::set_var(CONFIG_ENV_VAR, value),
            None => std::env::remove_var(CONFIG_ENV_VAR),
        }

        assert_eq!(from_env, PathBuf::from("/tmp/custom-gojsonrpc.json"));
        assert!(fallback.is_absolute());
        assert!(
            fallback.ends_with("gojsonrpc/client.json"),
            "unexpected path: {}",
            fallback.display()
        );
    }
}
