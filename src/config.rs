//! Configuration for the remote backend and local cache location.
//!
//! The remote endpoint comes from the environment (`.env` files are
//! honored). Missing configuration is not an error: it is the signal
//! that the application runs local-only.

use std::path::PathBuf;

use anyhow::Result;

/// Application name used for cache directory paths
const APP_NAME: &str = "cartcache";

/// Environment variable holding the remote base URL
const ENV_REMOTE_URL: &str = "CARTCACHE_REMOTE_URL";

/// Environment variable holding the remote API key
const ENV_REMOTE_KEY: &str = "CARTCACHE_REMOTE_KEY";

/// Connection details for the hosted relational store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub api_key: String,
}

impl RemoteConfig {
    /// Read the remote endpoint from the environment.
    ///
    /// Returns `None` when either variable is missing or blank - the
    /// unconfigured-backend signal every remote call handles as a
    /// no-op rather than a crash.
    pub fn from_env() -> Option<Self> {
        // Load .env if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let url = std::env::var(ENV_REMOTE_URL).ok()?;
        let api_key = std::env::var(ENV_REMOTE_KEY).ok()?;
        if url.trim().is_empty() || api_key.trim().is_empty() {
            return None;
        }
        Some(Self { url, api_key })
    }
}

/// Platform cache directory for the local JSON buckets.
pub fn cache_dir() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
    Ok(cache_dir.join(APP_NAME))
}
