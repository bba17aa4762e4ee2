// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_prefix() -> String {
    "/v0".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

// How long an externally stopped event may keep showing as running.
fn default_status_poll() -> u64 {
    30
}

fn default_tick_millis() -> u64 {
    1000
}

fn default_page_size() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// IANA zone sent with timezone-aware requests. Falls back to `TZ`, then UTC.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_status_poll")]
    pub status_poll_secs: u64,
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_prefix: default_api_prefix(),
            timezone: None,
            request_timeout_secs: default_request_timeout(),
            status_poll_secs: default_status_poll(),
            tick_millis: default_tick_millis(),
            page_size: default_page_size(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        // Explicitly detect missing file so callers can fall back to defaults.
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Missing file means defaults; any other failure is reported.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(c) => Ok(c),
            Err(e) if Self::is_missing_config_error(&e) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    ///  - Fast path: check for our explicit "Config file not found" message
    ///  - Look for underlying IO NotFound errors in the error chain
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Get the path string using an explicit context.
    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    /// `api_url` joined with `api_prefix`, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn status_poll_interval(&self) -> Duration {
        Duration::from_secs(self.status_poll_secs.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis.max(1))
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
