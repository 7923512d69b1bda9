//! Configuration handling for the sandbox

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::form::FormOptions;
use crate::sdk::{SdkMode, DEFAULT_LATENCY};

/// Environment variable overriding the configured SDK mode
pub const MODE_ENV: &str = "SDK_SANDBOX_MODE";

/// User configuration for the sandbox
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SandboxConfig {
    /// SDK mode used when generating keys
    pub mode: Option<SdkMode>,
    /// Simulated network delay in milliseconds
    pub latency_ms: Option<u64>,
    /// Whether the user lookup endpoint fails on purpose
    pub fail_user_lookup: Option<bool>,
    /// Checkout amount in minor units
    pub charge_amount: Option<u64>,
    /// Checkout currency code
    pub charge_currency: Option<String>,
    /// Revalidate touched fields while typing
    pub validate_on_change: Option<bool>,
    /// Validate fields when they lose focus
    pub validate_on_blur: Option<bool>,
}

impl SandboxConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "sdk-sandbox", "sdk-sandbox")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from `path`, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: SandboxConfig = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply the mode override from the environment, if any
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_mode_override(std::env::var(MODE_ENV).ok().as_deref())
    }

    fn with_mode_override(mut self, mode: Option<&str>) -> Result<Self> {
        if let Some(mode) = mode {
            self.mode = Some(mode.parse::<SdkMode>()?);
        }
        Ok(self)
    }

    pub fn mode(&self) -> SdkMode {
        self.mode.unwrap_or_default()
    }

    pub fn latency(&self) -> Duration {
        self.latency_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LATENCY)
    }

    pub fn fail_user_lookup(&self) -> bool {
        self.fail_user_lookup.unwrap_or(true)
    }

    pub fn charge_amount(&self) -> u64 {
        self.charge_amount.unwrap_or(2000)
    }

    pub fn charge_currency(&self) -> &str {
        self.charge_currency.as_deref().unwrap_or("usd")
    }

    pub fn form_options(&self) -> FormOptions {
        let defaults = FormOptions::default();
        FormOptions {
            validate_on_change: self.validate_on_change.unwrap_or(defaults.validate_on_change),
            validate_on_blur: self.validate_on_blur.unwrap_or(defaults.validate_on_blur),
        }
    }
}
