//! Configuration structures.
//!
//! Constructed once at process start (see `stockline-infra::config`) and
//! injected into the components that need them.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub marketplace: MarketplaceConfig,
}

/// HTTP server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 3000 }
    }
}

/// MercadoLibre integration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    /// OAuth client id registered with the marketplace.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Redirect URI registered for the OAuth callback.
    pub redirect_uri: String,

    /// Secret used to sign the OAuth `state` parameter.
    pub state_secret: String,

    /// REST API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Authorization endpoint base URL.
    #[serde(default = "default_auth_base")]
    pub auth_base: String,

    /// Tokens within this many seconds of expiry are refreshed.
    #[serde(default = "default_refresh_lead_seconds")]
    pub refresh_lead_seconds: i64,

    /// Background refresh sweep interval in seconds.
    #[serde(default = "default_refresh_interval_seconds")]
    pub refresh_interval_seconds: u64,

    /// Concurrent remote calls during a sync run.
    #[serde(default = "default_sync_concurrency")]
    pub sync_concurrency: usize,

    /// Timeout applied to every remote call, in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_api_base() -> String {
    constants::DEFAULT_API_BASE.to_string()
}

fn default_auth_base() -> String {
    constants::DEFAULT_AUTH_BASE.to_string()
}

const fn default_refresh_lead_seconds() -> i64 {
    constants::DEFAULT_REFRESH_LEAD_SECONDS
}

const fn default_refresh_interval_seconds() -> u64 {
    constants::DEFAULT_REFRESH_INTERVAL_SECONDS
}

const fn default_sync_concurrency() -> usize {
    constants::DEFAULT_SYNC_CONCURRENCY
}

const fn default_request_timeout_seconds() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_SECONDS
}

impl MarketplaceConfig {
    /// Build a configuration with default endpoints and tuning values.
    ///
    /// Primarily used by tests and the env loader; production values come
    /// from the environment.
    #[must_use]
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        state_secret: String,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            state_secret,
            api_base: default_api_base(),
            auth_base: default_auth_base(),
            refresh_lead_seconds: default_refresh_lead_seconds(),
            refresh_interval_seconds: default_refresh_interval_seconds(),
            sync_concurrency: default_sync_concurrency(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_default_endpoints() {
        let config = MarketplaceConfig::new(
            "client".to_string(),
            "secret".to_string(),
            "http://localhost/callback".to_string(),
            "state-secret".to_string(),
        );

        assert_eq!(config.api_base, constants::DEFAULT_API_BASE);
        assert_eq!(config.auth_base, constants::DEFAULT_AUTH_BASE);
        assert_eq!(config.refresh_lead_seconds, 3_600);
        assert_eq!(config.sync_concurrency, 4);
    }

    #[test]
    fn deserializes_with_defaults_for_optional_fields() {
        let json = r#"{
            "client_id": "client",
            "client_secret": "secret",
            "redirect_uri": "http://localhost/callback",
            "state_secret": "state-secret"
        }"#;

        let config: MarketplaceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.api_base, constants::DEFAULT_API_BASE);
        assert_eq!(config.refresh_interval_seconds, 3_600);
    }
}
