//! # Meter Configuration
//!
//! Configuration management for the meter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TAXIMETER_NIGHT_START=18                                           │
//! │     TAXIMETER_TICK_MS=1000                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/meter/meter.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.taximeter.meter/meter.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Day/night tariff, 17:00-06:00 night window, 1s ticks               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # meter.toml
//! [device]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Cab 12"
//!
//! [rates]
//! currency = "kr"
//! night_start_hour = 17
//! night_end_hour = 6
//!
//! [rates.day]
//! start_fare = 39.0
//! per_km_rate = 11.0
//! per_minute_rate = 6.0
//!
//! [rates.night]
//! start_fare = 49.0
//! per_km_rate = 14.0
//! per_minute_rate = 7.5
//!
//! [clock]
//! tick_interval_ms = 1000
//!
//! [tracking]
//! min_step_m = 5.0
//! max_accuracy_m = 50.0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use taxi_core::geo::{DEFAULT_MAX_ACCURACY_M, DEFAULT_MIN_STEP_M};
use taxi_core::validation::{validate_non_negative, validate_schedule};
use taxi_core::RateSchedule;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{MeterError, MeterResult};

// =============================================================================
// Device Configuration
// =============================================================================

/// Identity of this meter unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Unique device identifier (UUID v4).
    /// Auto-generated on first run if not provided.
    #[serde(default = "generate_device_id")]
    pub id: String,

    /// Human-readable name (e.g., "Cab 12").
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn generate_device_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_device_name() -> String {
    "Taxi Meter".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            id: generate_device_id(),
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Clock Settings
// =============================================================================

/// Trip clock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockSettings {
    /// Milliseconds between ticks. Each tick counts as one trip second.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

fn default_tick_interval() -> u64 {
    1000
}

impl Default for ClockSettings {
    fn default() -> Self {
        ClockSettings {
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl ClockSettings {
    /// Returns the tick period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

// =============================================================================
// Tracking Settings
// =============================================================================

/// Position tracking thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingSettings {
    /// Steps shorter than this (metres) are treated as jitter.
    #[serde(default = "default_min_step")]
    pub min_step_m: f64,

    /// Fixes with a worse reported accuracy (metres) are ignored.
    #[serde(default = "default_max_accuracy")]
    pub max_accuracy_m: f64,
}

fn default_min_step() -> f64 {
    DEFAULT_MIN_STEP_M
}

fn default_max_accuracy() -> f64 {
    DEFAULT_MAX_ACCURACY_M
}

impl Default for TrackingSettings {
    fn default() -> Self {
        TrackingSettings {
            min_step_m: default_min_step(),
            max_accuracy_m: default_max_accuracy(),
        }
    }
}

// =============================================================================
// Main Meter Configuration
// =============================================================================

/// Complete meter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeterConfig {
    /// Device identity.
    #[serde(default)]
    pub device: DeviceConfig,

    /// Tariff and night window.
    #[serde(default)]
    pub rates: RateSchedule,

    /// Trip clock settings.
    #[serde(default)]
    pub clock: ClockSettings,

    /// Position tracking settings.
    #[serde(default)]
    pub tracking: TrackingSettings,
}

impl MeterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (meter.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> MeterResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading meter config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load meter config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> MeterResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| MeterError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MeterError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| MeterError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Meter config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> MeterResult<()> {
        if self.device.id.is_empty() {
            return Err(MeterError::InvalidConfig("device.id must not be empty".into()));
        }

        validate_schedule(&self.rates)?;

        if self.clock.tick_interval_ms == 0 {
            return Err(MeterError::InvalidConfig(
                "tick_interval_ms must be greater than 0".into(),
            ));
        }

        validate_non_negative("tracking.min_step_m", self.tracking.min_step_m)?;
        validate_non_negative("tracking.max_accuracy_m", self.tracking.max_accuracy_m)?;

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("TAXIMETER_DEVICE_NAME") {
            self.device.name = name;
        }

        if let Ok(currency) = std::env::var("TAXIMETER_CURRENCY") {
            self.rates.currency = currency;
        }

        if let Ok(hour) = std::env::var("TAXIMETER_NIGHT_START") {
            match hour.parse::<u8>() {
                Ok(h) => {
                    debug!(hour = h, "Overriding night start from environment");
                    self.rates.night_start_hour = h;
                }
                Err(_) => warn!(value = %hour, "Ignoring invalid TAXIMETER_NIGHT_START"),
            }
        }

        if let Ok(hour) = std::env::var("TAXIMETER_NIGHT_END") {
            match hour.parse::<u8>() {
                Ok(h) => {
                    debug!(hour = h, "Overriding night end from environment");
                    self.rates.night_end_hour = h;
                }
                Err(_) => warn!(value = %hour, "Ignoring invalid TAXIMETER_NIGHT_END"),
            }
        }

        if let Ok(ms) = std::env::var("TAXIMETER_TICK_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.clock.tick_interval_ms = v,
                Err(_) => warn!(value = %ms, "Ignoring invalid TAXIMETER_TICK_MS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "taximeter", "meter")
            .map(|dirs| dirs.config_dir().join("meter.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the device ID.
    pub fn device_id(&self) -> &str {
        &self.device.id
    }

    /// Returns the rate schedule.
    pub fn schedule(&self) -> &RateSchedule {
        &self.rates
    }
}
