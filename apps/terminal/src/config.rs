//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line flags (highest priority)                              │
//! │     --catalog-url http://10.0.0.5:5050 --scanner /dev/ttyACM0          │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     SELFCOUNTER_CATALOG_URL, SELFCOUNTER_SCANNER_DEVICE, ...           │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/selfcounter/config.toml (Linux)                          │
//! │     ~/Library/Application Support/com.selfcounter.pos/config.toml      │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     http://localhost:5050, 10 s timeout, keyboard entry only, "Rs."    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [catalog]
//! base_url = "http://localhost:5050"
//! timeout_secs = 10
//!
//! [scanner]
//! device = "/dev/ttyACM0"   # omit for keyboard entry only
//! sound = true
//!
//! [display]
//! store_name = "Self Counter"
//! currency_symbol = "Rs."
//! currency_decimals = 2
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use selfcounter_catalog::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use selfcounter_catalog::CatalogConfig;
use selfcounter_core::Money;

use crate::error::{AppError, AppResult};

// =============================================================================
// Catalog Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Base URL of the catalog service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// =============================================================================
// Scanner Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Line-oriented scanner device (serial port, FIFO, file).
    /// Unset means barcodes are typed at the terminal.
    #[serde(default)]
    pub device: Option<PathBuf>,

    /// Beep on every decode.
    #[serde(default = "default_true")]
    pub sound: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            device: None,
            sound: true,
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Header line.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Decimals shown after the point (0 to 4).
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,
}

fn default_store_name() -> String {
    "Self Counter".to_string()
}

fn default_currency_symbol() -> String {
    "Rs.".to_string()
}

fn default_currency_decimals() -> u8 {
    2
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            store_name: default_store_name(),
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
        }
    }
}

impl DisplaySettings {
    /// Formats an amount as a currency string.
    ///
    /// Amounts are held in hundredths. Fewer than two decimals rounds half
    /// away from zero; more pads with zeros.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let display = DisplaySettings::default();
    /// assert_eq!(display.format_currency(Money::from_cents(15000)), "Rs.150.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = u32::from(self.currency_decimals);

        let scaled = if decimals >= 2 {
            cents
                .unsigned_abs()
                .saturating_mul(10_u64.pow(decimals - 2))
        } else {
            let unit = 10_u64.pow(2 - decimals);
            (cents.unsigned_abs() + unit / 2) / unit
        };
        let divisor = 10_u64.pow(decimals);
        let whole = scaled / divisor;
        let frac = scaled % divisor;

        format!(
            "{}{}{}",
            if cents < 0 && scaled != 0 { "-" } else { "" },
            self.currency_symbol,
            if decimals > 0 {
                format!("{}.{:0width$}", whole, frac, width = decimals as usize)
            } else {
                whole.to_string()
            }
        )
    }
}

// =============================================================================
// App Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config.toml`)
    /// 3. Environment variables
    ///
    /// An explicitly given path must exist; the default path is optional.
    /// Validation is left to the caller so command line flags can still
    /// be applied on top.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => {
                    warn!("Could not determine config directory, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reads and parses one TOML file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        self.catalog_config()
            .validate()
            .map_err(|e| AppError::InvalidConfig(e.to_string()))?;

        if self.display.currency_decimals > 4 {
            return Err(AppError::InvalidConfig(format!(
                "currency_decimals must be at most 4, got: {}",
                self.display.currency_decimals
            )));
        }

        if let Some(device) = &self.scanner.device {
            if device.as_os_str().is_empty() {
                return Err(AppError::InvalidConfig(
                    "scanner device path is empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Settings for the catalog client.
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(self.catalog.base_url.clone())
            .timeout(Duration::from_secs(self.catalog.timeout_secs))
    }

    /// Applies `SELFCOUNTER_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SELFCOUNTER_CATALOG_URL") {
            debug!(url = %url, "Overriding catalog URL from environment");
            self.catalog.base_url = url;
        }

        if let Some(secs) = var("SELFCOUNTER_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.catalog.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric SELFCOUNTER_TIMEOUT_SECS"),
            }
        }

        if let Some(device) = var("SELFCOUNTER_SCANNER_DEVICE") {
            debug!(device = %device, "Overriding scanner device from environment");
            self.scanner.device = if device.is_empty() {
                None
            } else {
                Some(PathBuf::from(device))
            };
        }

        if let Some(sound) = var("SELFCOUNTER_SOUND") {
            match sound.to_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.scanner.sound = true,
                "0" | "false" | "off" | "no" => self.scanner.sound = false,
                _ => warn!(value = %sound, "Unknown SELFCOUNTER_SOUND value"),
            }
        }

        if let Some(name) = var("SELFCOUNTER_STORE_NAME") {
            self.display.store_name = name;
        }

        if let Some(symbol) = var("SELFCOUNTER_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "selfcounter", "pos")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
