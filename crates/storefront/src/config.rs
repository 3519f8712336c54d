//! Storefront configuration loaded from environment variables.
//!
//! Every variable has a usable default, so a bare `cargo run` serves the
//! built-in catalog against the public Econt endpoint.
//!
//! # Environment Variables
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 3000)
//! - `ECONT_API_BASE` - Base URL of the Econt JSON services (default:
//!   <https://ee.econt.com/services>)
//! - `ECONT_TIMEOUT_SECS` - Courier request timeout in seconds (default: 5)
//! - `SENDER_CITY_ID` - Econt city id shipments originate from (default: 1,
//!   Sofia)
//! - `COUNTRY_CODE` - ISO 3166-1 alpha-3 country for courier lookups
//!   (default: BGR)
//! - `SNAPSHOT_PATH` - Session snapshot file (default:
//!   rupite-greens-store.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN (optional)
//! - `ENVIRONMENT` - Deploy environment reported to Sentry (default:
//!   development)
//! - `RUST_LOG` - Tracing filter override

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use rupite_greens_core::CityId;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Courier API configuration
    pub econt: EcontConfig,
    /// Where the session snapshot is read and written
    pub snapshot_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Deploy environment reported to Sentry
    pub environment: String,
}

/// Econt courier API configuration.
#[derive(Debug, Clone)]
pub struct EcontConfig {
    /// Base URL of the JSON services, with or without a trailing slash
    pub base_url: Url,
    /// ISO 3166-1 alpha-3 country code for city and office lookups
    pub country_code: String,
    /// City shipments are priced from
    pub sender_city_id: CityId,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("HOST", get_env_or_default("HOST", "0.0.0.0"))?;
        let port = parse_env("PORT", get_env_or_default("PORT", "3000"))?;
        let econt = EcontConfig::from_env()?;
        let snapshot_path = PathBuf::from(get_env_or_default(
            "SNAPSHOT_PATH",
            "rupite-greens-store.json",
        ));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let environment = get_env_or_default("ENVIRONMENT", "development");

        Ok(Self {
            host,
            port,
            econt,
            snapshot_path,
            sentry_dsn,
            environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EcontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_env(
            "ECONT_API_BASE",
            get_env_or_default("ECONT_API_BASE", "https://ee.econt.com/services"),
        )?;
        let country_code = get_env_or_default("COUNTRY_CODE", "BGR");
        let sender_city_id = CityId::new(parse_env(
            "SENDER_CITY_ID",
            get_env_or_default("SENDER_CITY_ID", "1"),
        )?);
        let timeout_secs = parse_env(
            "ECONT_TIMEOUT_SECS",
            get_env_or_default("ECONT_TIMEOUT_SECS", "5"),
        )?;

        Ok(Self {
            base_url,
            country_code,
            sender_city_id,
            timeout_secs,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a raw value, naming the variable on failure.
fn parse_env<T>(key: &str, raw: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
