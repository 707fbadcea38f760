//! Transport configuration.
//!
//! Built in code via [`ClientConfig::builder`], or loaded from a JSON file
//! with environment overrides:
//!
//! ```json
//! { "handshake_timeout_ms": 2000, "headers": [["Origin", "https://example.com"]] }
//! ```

// Rust guideline compliant 2026-02

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default WebSocket handshake timeout.
pub const DEFAULT_HANDSHAKE_TIMEOUT_MS: u64 = 1000;

/// Environment variable overriding the handshake timeout (milliseconds).
pub const HANDSHAKE_TIMEOUT_ENV: &str = "CABLE_HANDSHAKE_TIMEOUT_MS";
/// Environment variable setting the `Origin` handshake header.
pub const ORIGIN_ENV: &str = "CABLE_ORIGIN";

/// Configuration handed to the [`Connector`](crate::transport::Connector).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum time for the transport handshake, in milliseconds.
    pub handshake_timeout_ms: u64,
    /// Extra headers sent with the handshake request (e.g. `Origin`).
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            handshake_timeout_ms: DEFAULT_HANDSHAKE_TIMEOUT_MS,
            headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Handshake timeout as a `Duration`.
    #[must_use]
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    /// Load a config from a JSON file, then apply environment overrides.
    /// Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `CABLE_HANDSHAKE_TIMEOUT_MS` and `CABLE_ORIGIN` if set.
    /// An unparsable timeout is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(timeout) = std::env::var(HANDSHAKE_TIMEOUT_ENV) {
            match timeout.parse() {
                Ok(ms) => self.handshake_timeout_ms = ms,
                Err(e) => log::warn!(
                    "[Cable] Ignoring {}={:?}: {}",
                    HANDSHAKE_TIMEOUT_ENV,
                    timeout,
                    e
                ),
            }
        }
        if let Ok(origin) = std::env::var(ORIGIN_ENV) {
            self.set_header("Origin", origin);
        }
    }

    /// Set a header, replacing any existing one with the same name
    /// (compared case-insensitively).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the handshake timeout.
    #[must_use]
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Add a handshake header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.set_header(name, value);
        self
    }

    /// Build the config.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_handshake_timeout_is_one_second() {
        let config = ClientConfig::default();
        assert_eq!(config.handshake_timeout(), Duration::from_secs(1));
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = ClientConfig::builder()
            .handshake_timeout(Duration::from_millis(250))
            .header("Origin", "https://a.example")
            .header("origin", "https://b.example")
            .build();

        assert_eq!(config.handshake_timeout_ms, 250);
        assert_eq!(
            config.headers,
            vec![("origin".to_string(), "https://b.example".to_string())]
        );
    }

    #[test]
    fn test_load_from_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"headers": [["X-Client", "test"]]}}"#).unwrap();

        let config = ClientConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.headers, vec![("X-Client".to_string(), "test".to_string())]);
        assert_eq!(config.handshake_timeout_ms, DEFAULT_HANDSHAKE_TIMEOUT_MS);
    }

    #[test]
    fn test_load_from_file_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = ClientConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClientConfig::load_from_file(&dir.path().join("absent.json"));
        assert!(result.is_err());
    }
}
