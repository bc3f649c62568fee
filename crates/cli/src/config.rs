//! Configuration management for the CLI
//!
//! Settings come from environment variables with the `USYNC` prefix and
//! `__` as the nesting separator, e.g. `USYNC__LOCAL__CLIENT_ID` or
//! `USYNC__WINDOW_START`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use sync_lib::{AuthConfig, HttpResourceApi};

/// Connection settings for one scheduling API instance
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSettings {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth token endpoint
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_url: default_auth_url(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

/// Sync tool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// The system being converged (mutated)
    #[serde(default)]
    pub local: EndpointSettings,

    /// The source-of-truth system (read-only)
    #[serde(default)]
    pub master: EndpointSettings,

    /// Lower bound for unavailability listings
    #[serde(default = "default_window_start")]
    pub window_start: DateTime<Utc>,

    /// Optional token cache file shared across invocations
    #[serde(default)]
    pub token_cache: Option<PathBuf>,
}

fn default_base_url() -> String {
    "https://api.qargo.io/v1/".to_string()
}

fn default_auth_url() -> String {
    "https://api.qargo.com/v1/auth/token".to_string()
}

fn default_window_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

impl Settings {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("USYNC").separator("__"))
            .build()?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;

        Ok(settings)
    }

    /// Credentials have no defaults; fail fast naming the missing variable
    fn validate(&self) -> Result<()> {
        for (name, endpoint) in [("LOCAL", &self.local), ("MASTER", &self.master)] {
            if endpoint.client_id.is_empty() {
                bail!("USYNC__{name}__CLIENT_ID must be set");
            }
            if endpoint.client_secret.is_empty() {
                bail!("USYNC__{name}__CLIENT_SECRET must be set");
            }
        }
        Ok(())
    }

    /// Build an authenticated API client for one endpoint
    pub fn api_client(&self, endpoint: &EndpointSettings) -> Result<HttpResourceApi> {
        HttpResourceApi::new(
            &endpoint.base_url,
            AuthConfig {
                auth_url: endpoint.auth_url.clone(),
                client_id: endpoint.client_id.clone(),
                client_secret: endpoint.client_secret.clone(),
                cache_path: self.token_cache.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_credentials() -> Settings {
        Settings {
            local: EndpointSettings {
                client_id: "local-id".to_string(),
                client_secret: "local-secret".to_string(),
                ..Default::default()
            },
            master: EndpointSettings {
                client_id: "master-id".to_string(),
                client_secret: "master-secret".to_string(),
                ..Default::default()
            },
            window_start: default_window_start(),
            token_cache: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_credentials() {
        assert!(settings_with_credentials().validate().is_ok());
    }

    #[test]
    fn test_validate_names_missing_variable() {
        let mut settings = settings_with_credentials();
        settings.master.client_secret = String::new();

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("USYNC__MASTER__CLIENT_SECRET"));
    }

    #[test]
    fn test_default_window_start() {
        let window = default_window_start();
        assert_eq!(window.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
