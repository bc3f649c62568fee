//! OAuth2 client-credentials token acquisition
//!
//! Tokens are cached in memory for the lifetime of the provider and,
//! optionally, in a JSON file on disk so consecutive invocations reuse a
//! live token. Expiry is tracked with a refresh buffer so tokens are
//! renewed shortly before the API would reject them.

use crate::api::ApiError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Seconds subtracted from a token's lifetime before it counts as expired
const TOKEN_REFRESH_BUFFER_SECS: i64 = 60;

/// Credentials and token endpoint for one API instance
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token endpoint URL
    pub auth_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Optional JSON file caching tokens across invocations
    pub cache_path: Option<PathBuf>,
}

/// A token with its absolute expiry (Unix seconds, refresh buffer applied)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Utc::now().timestamp() < self.expires_at
    }
}

/// Shape of the token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Fetches and caches bearer tokens for one set of client credentials
pub struct TokenProvider {
    config: AuthConfig,
    http: reqwest::Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider using the given HTTP client
    pub fn new(config: AuthConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            cached: RwLock::new(None),
        }
    }

    /// Get a valid bearer token, fetching a new one only when needed
    pub async fn token(&self) -> Result<String, ApiError> {
        {
            let cached = self.cached.read().await;
            if let Some(entry) = cached.as_ref() {
                if entry.is_valid() {
                    return Ok(entry.token.clone());
                }
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(entry) = cached.as_ref() {
            if entry.is_valid() {
                return Ok(entry.token.clone());
            }
        }

        if let Some(entry) = self.load_disk_cache() {
            if entry.is_valid() {
                debug!(client_id = %self.config.client_id, "Loaded cached API token");
                let token = entry.token.clone();
                *cached = Some(entry);
                return Ok(token);
            }
        }

        let entry = self.fetch_token().await?;
        self.save_disk_cache(&entry);
        let token = entry.token.clone();
        *cached = Some(entry);
        Ok(token)
    }

    /// Fetch a fresh token via the client-credentials flow
    async fn fetch_token(&self) -> Result<CachedToken, ApiError> {
        let response = self
            .http
            .post(&self.config.auth_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let data: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("invalid token response: {e}")))?;

        let token = data
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Auth("token missing from response".to_string()))?;

        let expires_at = Utc::now().timestamp() + data.expires_in - TOKEN_REFRESH_BUFFER_SECS;
        debug!(
            client_id = %self.config.client_id,
            expires_at,
            "Fetched new API token"
        );

        Ok(CachedToken { token, expires_at })
    }

    /// Look up a token for our client id in the on-disk cache
    fn load_disk_cache(&self) -> Option<CachedToken> {
        let path = self.config.cache_path.as_deref()?;
        match read_cache_file(path) {
            Ok(cache) => cache.get(&self.config.client_id).cloned(),
            Err(e) => {
                warn!(error = %e, "Failed to read token cache");
                None
            }
        }
    }

    /// Persist a token for our client id; failures are logged, never fatal
    fn save_disk_cache(&self, entry: &CachedToken) {
        let Some(path) = self.config.cache_path.as_deref() else {
            return;
        };

        let mut cache = read_cache_file(path).unwrap_or_default();
        cache.insert(self.config.client_id.clone(), entry.clone());

        if let Err(e) = write_cache_file(path, &cache) {
            warn!(error = %e, "Could not write token cache");
        } else {
            debug!(client_id = %self.config.client_id, "Token cached locally");
        }
    }
}

fn read_cache_file(path: &Path) -> anyhow::Result<HashMap<String, CachedToken>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Write the cache atomically so a crash cannot leave it truncated
fn write_cache_file(path: &Path, cache: &HashMap<String, CachedToken>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(cache)?;
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, &json)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
