//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MILLET_API_BASE_URL` - Base URL of the marketplace REST API
//!
//! ## Optional
//! - `MILLET_API_TIMEOUT_SECS` - Whole-request timeout (default: 30)
//! - `MILLET_API_CONNECT_TIMEOUT_SECS` - TCP/TLS connect timeout (default: 10)
//! - `MILLET_CATALOG_CACHE_TTL_SECS` - Catalog response cache TTL (default: 300)
//! - `MILLET_SESSION_DIR` - Directory holding the session file (default: .millet-market)
//! - `MILLET_SESSION_NAMESPACE` - Session namespace / file stem (default: `millet_session`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_SESSION_DIR: &str = ".millet-market";

/// Default session namespace.
pub const DEFAULT_SESSION_NAMESPACE: &str = "millet_session";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, always ending in `/` so relative paths join beneath it
    pub api_base_url: Url,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Time-to-live for cached catalog responses
    pub catalog_cache_ttl: Duration,
    /// Directory for the persisted session
    pub session_dir: PathBuf,
    /// Session namespace
    pub session_namespace: String,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not an
    /// absolute http(s) URL.
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("MILLET_API_BASE_URL", api_base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            session_dir: PathBuf::from(DEFAULT_SESSION_DIR),
            session_namespace: DEFAULT_SESSION_NAMESPACE.to_string(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = get_required_env("MILLET_API_BASE_URL")?;
        let mut config = Self::new(&base_url)?;

        config.request_timeout =
            get_duration_secs("MILLET_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        config.connect_timeout = get_duration_secs(
            "MILLET_API_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        config.catalog_cache_ttl =
            get_duration_secs("MILLET_CATALOG_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        config.session_dir = PathBuf::from(get_env_or_default(
            "MILLET_SESSION_DIR",
            DEFAULT_SESSION_DIR,
        ));
        config.session_namespace =
            get_env_or_default("MILLET_SESSION_NAMESPACE", DEFAULT_SESSION_NAMESPACE);
        config.validate()?;

        Ok(config)
    }

    /// Check fields that may have been set after construction.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the session namespace would not
    /// make a plain file name inside `session_dir`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_namespace(&self.session_namespace)
    }

    /// Path of the session file for the configured namespace.
    #[must_use]
    pub fn session_path(&self) -> PathBuf {
        self.session_dir
            .join(format!("{}.json", self.session_namespace))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a whole number of seconds, rejecting zero.
fn get_duration_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(Duration::from_secs(default));
    };
    parse_duration_secs(key, &raw)
}

fn parse_duration_secs(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse the API base URL, forcing a trailing slash so `Url::join` keeps the
/// path prefix (`https://host/api` + `products` → `https://host/api/products`).
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Namespaces become file names; keep them to a safe alphabet.
fn validate_namespace(namespace: &str) -> Result<(), ConfigError> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "MILLET_SESSION_NAMESPACE".to_string(),
            "may only contain letters, digits, '_' and '-'".to_string(),
        ))
    }
}
