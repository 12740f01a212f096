//! Application configuration management.
//!
//! Configuration covers where the remote service lives, how requests are
//! signed and where the cached access token is kept. It is stored at
//! `~/.config/go2link/config.json`; a missing file means defaults.
//!
//! Account credentials are deliberately not part of the configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::crypto::KeyWrap;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "go2link";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Token file name in cache directory
const TOKEN_FILE: &str = "token";

pub const DEFAULT_BASE_URL: &str = "https://global-robot-api.unitree.com/";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header the access token travels in.
pub const DEFAULT_TOKEN_HEADER: &str = "Token";

/// Seconds before `exp` at which a token counts as expired.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Explicit token file; defaults to the cache directory
    pub token_file: Option<PathBuf>,
    pub token_header: String,
    /// Enables `AppSign` request signing when set
    pub app_sign_secret: Option<String>,
    /// Static headers sent with every request (app name, platform, ...)
    pub extra_headers: BTreeMap<String, String>,
    pub key_wrap: KeyWrap,
    pub refresh_margin_secs: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_file: None,
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            app_sign_secret: None,
            extra_headers: BTreeMap::new(),
            key_wrap: KeyWrap::default(),
            refresh_margin_secs: DEFAULT_REFRESH_MARGIN_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Path of the cached access token
    pub fn token_path(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.token_file {
            return Ok(path.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(TOKEN_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.refresh_margin_secs, 60);
        assert_eq!(config.key_wrap, KeyWrap::Oaep);
        assert!(config.app_sign_secret.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"key_wrap": "pkcs1v15", "token_file": "/tmp/t"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.key_wrap, KeyWrap::Pkcs1v15);
        assert_eq!(config.token_path().unwrap(), PathBuf::from("/tmp/t"));
        assert_eq!(config.token_header, DEFAULT_TOKEN_HEADER);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.app_sign_secret = Some("s3cret".to_string());
        config.extra_headers.insert("AppName".to_string(), "Go2".to_string());
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.app_sign_secret.as_deref(), Some("s3cret"));
        assert_eq!(loaded.extra_headers.get("AppName").map(String::as_str), Some("Go2"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
