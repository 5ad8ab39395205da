//! Configuration loader
//!
//! Loads application configuration from environment variables. The binary
//! loads a `.env` file (if any) before calling into this module.
//!
//! ## Environment Variables
//! Required:
//! - `STOCKLINE_ML_CLIENT_ID`: OAuth client id
//! - `STOCKLINE_ML_CLIENT_SECRET`: OAuth client secret
//! - `STOCKLINE_ML_REDIRECT_URI`: OAuth callback redirect URI
//! - `STOCKLINE_STATE_SECRET`: secret signing the OAuth `state` parameter
//!
//! Optional (defaults in parentheses):
//! - `STOCKLINE_ML_API_BASE` (`https://api.mercadolibre.com`)
//! - `STOCKLINE_ML_AUTH_BASE` (`https://auth.mercadolibre.com.ar`)
//! - `STOCKLINE_REFRESH_LEAD_SECONDS` (3600)
//! - `STOCKLINE_REFRESH_INTERVAL_SECONDS` (3600)
//! - `STOCKLINE_SYNC_CONCURRENCY` (4)
//! - `STOCKLINE_REQUEST_TIMEOUT_SECONDS` (30)
//! - `STOCKLINE_HOST` (`127.0.0.1`), `STOCKLINE_PORT` (3000)

use std::fmt::Display;
use std::str::FromStr;

use stockline_domain::{Config, MarketplaceConfig, Result, ServerConfig, StocklineError};

/// Load configuration from environment variables.
///
/// # Errors
/// Returns `StocklineError::Config` if a required variable is missing or a
/// numeric override has an invalid value.
pub fn load() -> Result<Config> {
    let mut marketplace = MarketplaceConfig::new(
        env_var("STOCKLINE_ML_CLIENT_ID")?,
        env_var("STOCKLINE_ML_CLIENT_SECRET")?,
        env_var("STOCKLINE_ML_REDIRECT_URI")?,
        env_var("STOCKLINE_STATE_SECRET")?,
    );

    if let Ok(api_base) = std::env::var("STOCKLINE_ML_API_BASE") {
        marketplace.api_base = api_base;
    }
    if let Ok(auth_base) = std::env::var("STOCKLINE_ML_AUTH_BASE") {
        marketplace.auth_base = auth_base;
    }
    marketplace.refresh_lead_seconds =
        env_parse("STOCKLINE_REFRESH_LEAD_SECONDS", marketplace.refresh_lead_seconds)?;
    marketplace.refresh_interval_seconds =
        env_parse("STOCKLINE_REFRESH_INTERVAL_SECONDS", marketplace.refresh_interval_seconds)?;
    marketplace.sync_concurrency =
        env_parse("STOCKLINE_SYNC_CONCURRENCY", marketplace.sync_concurrency)?;
    marketplace.request_timeout_seconds =
        env_parse("STOCKLINE_REQUEST_TIMEOUT_SECONDS", marketplace.request_timeout_seconds)?;

    let server_defaults = ServerConfig::default();
    let server = ServerConfig {
        host: std::env::var("STOCKLINE_HOST").unwrap_or(server_defaults.host),
        port: env_parse("STOCKLINE_PORT", server_defaults.port)?,
    };

    tracing::info!("Configuration loaded from environment variables");
    Ok(Config { server, marketplace })
}

/// Get required environment variable.
///
/// # Errors
/// Returns `StocklineError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        StocklineError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable, falling back to `default`.
///
/// # Errors
/// Returns `StocklineError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| StocklineError::Config(format!("Invalid value for {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
