//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.caredash.toml` files.

use crate::api::ApiConfig;
use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".caredash.toml";

/// Longest accepted summary window (ten years).
pub const MAX_WINDOW_HOURS: i64 = 24 * 365 * 10;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend API settings.
    #[serde(default)]
    pub api: ApiSettings,

    /// Dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output format when `--format` is not given.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base address of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Unset waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

fn default_base_url() -> String {
    ApiConfig::default().base_url
}

/// Dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Length of the rolling summary window.
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
        }
    }
}

fn default_window_hours() -> i64 {
    crate::analysis::SUMMARY_WINDOW_HOURS
}

impl DashboardConfig {
    /// The configured window, or `None` when it is the standard 72 hours.
    pub fn custom_window(&self) -> Option<Duration> {
        (self.window_hours != default_window_hours()).then(|| Duration::hours(self.window_hours))
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.caredash.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = Some(timeout);
        }
        if let Some(hours) = args.window_hours {
            self.dashboard.window_hours = hours;
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.quiet {
            self.general.verbose = false;
        }
    }

    /// Check values that would otherwise fail later at request time.
    pub fn validate(&self) -> Result<(), String> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err("API URL must start with 'http://' or 'https://'".to_string());
        }
        if !(1..=MAX_WINDOW_HOURS).contains(&self.dashboard.window_hours) {
            return Err(format!(
                "Window must be between 1 and {} hours",
                MAX_WINDOW_HOURS
            ));
        }
        if self.api.timeout_seconds == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }
        Ok(())
    }

    /// Connection settings for the record fetcher.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api.base_url.clone(),
            timeout_seconds: self.api.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
