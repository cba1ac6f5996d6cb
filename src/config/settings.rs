//! User settings for SplitShare
//!
//! Manages the reporting currency, the two personal currency contexts, the
//! current user and the live rate source.

use serde::{Deserialize, Serialize};

use super::paths::SplitPaths;
use crate::error::SplitError;
use crate::models::{Currency, CurrencyContext, UserId};

/// Live exchange rate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSettings {
    /// Endpoint answering `{"base": "USD", "rates": {...}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Seconds a live quote stays fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Seconds before a live fetch is abandoned
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            enabled: true,
        }
    }
}

/// User settings for SplitShare
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency every balance is reported in
    #[serde(default)]
    pub base_currency: Currency,

    /// Currency of personal records flagged as home-country
    #[serde(default = "default_home_currency")]
    pub home_currency: Currency,

    /// Currency of personal records made abroad
    #[serde(default)]
    pub local_currency: Currency,

    /// The user whose perspective balances are shown from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user: Option<UserId>,

    #[serde(default)]
    pub rates: RateSettings,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_home_currency() -> Currency {
    Currency::Inr
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            base_currency: Currency::default(),
            home_currency: default_home_currency(),
            local_currency: Currency::default(),
            current_user: None,
            rates: RateSettings::default(),
            date_format: default_date_format(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Home and local currencies for personal records
    pub fn currency_context(&self) -> CurrencyContext {
        CurrencyContext::new(self.home_currency, self.local_currency)
    }

    /// The current user, or a configuration error telling how to set one
    pub fn require_current_user(&self) -> Result<UserId, SplitError> {
        self.current_user.ok_or_else(|| {
            SplitError::Config(
                "No current user set. Run 'splitshare config --current-user <id>'".into(),
            )
        })
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &SplitPaths) -> Result<Self, SplitError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| SplitError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SplitError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SplitPaths) -> Result<(), SplitError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| SplitError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SplitError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
