//! Runtime configuration parsed from environment variables.

use std::path::PathBuf;

/// Origin used when `CUSTOMER_API_BASE` is empty. The dev proxy listens
/// here, so "same origin" means "through the proxy".
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";
pub const DEFAULT_STORAGE_DIR: &str = ".customer-manager";
pub const DEFAULT_PROXY_TARGET: &str = "http://localhost:8000";
pub const DEFAULT_PROXY_PORT: u16 = 3000;
pub const DEFAULT_STUB_PORT: u16 = 8000;

/// Errors produced while parsing configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

// =============================================================================
// API
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Build from `CUSTOMER_API_BASE` (empty default = same origin).
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(std::env::var("CUSTOMER_API_BASE").unwrap_or_default().as_str())
    }

    #[must_use]
    pub fn new(raw_base: &str) -> Self {
        Self { base_url: resolve_base_url(raw_base) }
    }
}

/// Normalize a configured base URL: trailing slashes are dropped and an
/// empty value resolves to [`DEFAULT_ORIGIN`].
#[must_use]
pub fn resolve_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() { DEFAULT_ORIGIN.to_owned() } else { trimmed.to_owned() }
}

// =============================================================================
// STORAGE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl StorageConfig {
    /// Build from `CUSTOMER_STORAGE_DIR` (default `.customer-manager`).
    #[must_use]
    pub fn from_env() -> Self {
        let dir = std::env::var("CUSTOMER_STORAGE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_owned());
        Self { dir: PathBuf::from(dir) }
    }
}

// =============================================================================
// DEV TOOLING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub target: String,
    pub port: u16,
}

impl ProxyConfig {
    /// Build from `PROXY_API_TARGET` and `PROXY_PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if `PROXY_PORT` is set but not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let target = std::env::var("PROXY_API_TARGET")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROXY_TARGET.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let port = env_port("PROXY_PORT", DEFAULT_PROXY_PORT)?;
        Ok(Self { target, port })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubConfig {
    pub port: u16,
}

impl StubConfig {
    /// Build from `STUB_PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if `STUB_PORT` is set but not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self { port: env_port("STUB_PORT", DEFAULT_STUB_PORT)? })
    }
}

fn env_port(var: &'static str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
