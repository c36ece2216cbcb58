//! Application configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::{SherdorError, SherdorResult};
use crate::logging::LogFormat;

/// Environment variable overriding [`DataStoreConfig::url`].
pub const ENV_DATA_STORE_URL: &str = "SHERDOR_DATA_STORE_URL";
/// Environment variable overriding [`DataStoreConfig::api_key`].
pub const ENV_DATA_STORE_KEY: &str = "SHERDOR_DATA_STORE_KEY";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SherdorConfig {
    /// Progressive web app settings
    pub pwa: PwaConfig,

    /// Hosted data store settings
    pub data_store: DataStoreConfig,

    /// Logging settings
    pub logging: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PwaConfig {
    /// Title used for every notification the app shows
    pub app_name: String,

    /// Origin the app is served from; manifest paths resolve against it
    pub origin: String,

    /// Cache namespace. Bump the version suffix to invalidate the cache.
    pub cache_name: String,

    /// Paths fetched and cached when the service worker installs
    pub precache: Vec<String>,

    /// Icon and badge path for notifications
    pub icon: String,

    /// Body used when a push arrives without a payload
    pub push_default_body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStoreConfig {
    /// Base URL of the hosted data store
    pub url: String,

    /// Public (anon) API key
    pub api_key: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Level name (trace, debug, info, warn, error)
    pub level: String,

    /// Output format
    pub format: LogFormat,

    /// Include file and line in log lines
    pub include_location: bool,

    /// EnvFilter directive overriding `level`
    pub filter: Option<String>,
}

impl Default for PwaConfig {
    fn default() -> Self {
        Self {
            app_name: "Sherdor Mebel".to_string(),
            origin: "http://localhost:3000".to_string(),
            cache_name: "sherdor-mebel-v1".to_string(),
            precache: vec![
                "/".to_string(),
                "/manifest.json".to_string(),
                "/icon-192.jpg".to_string(),
                "/icon-512.jpg".to_string(),
            ],
            icon: "/icon-192.jpg".to_string(),
            push_default_body: "Yangi xabar".to_string(),
        }
    }
}

impl Default for DataStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            filter: None,
        }
    }
}

impl PwaConfig {
    /// Parsed app origin.
    pub fn origin_url(&self) -> SherdorResult<Url> {
        Ok(Url::parse(&self.origin)?)
    }

    /// Precache paths resolved against the origin, in manifest order.
    pub fn precache_urls(&self) -> SherdorResult<Vec<Url>> {
        let origin = self.origin_url()?;
        self.precache
            .iter()
            .map(|path| origin.join(path).map_err(SherdorError::from))
            .collect()
    }
}

impl DataStoreConfig {
    pub fn base_url(&self) -> SherdorResult<Url> {
        Ok(Url::parse(&self.url)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SherdorConfig {
    /// Default location of the config file (`<config dir>/sherdor/config.json`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sherdor")
            .join("config.json")
    }

    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> SherdorResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: SherdorConfig = serde_json::from_str(&contents).map_err(|e| {
            SherdorError::config(format!("invalid config {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> SherdorResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> SherdorResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_DATA_STORE_URL) {
            self.data_store.url = url;
        }
        if let Some(key) = lookup(ENV_DATA_STORE_KEY) {
            self.data_store.api_key = key;
        }
    }
}
