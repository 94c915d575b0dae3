//! TOML-based engine configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::series::{Cadence, LeapDayPolicy};

/// Top-level engine configuration parsed from TOML.
///
/// All fields have defaults. Load from TOML with
/// [`EngineConfig::from_toml_file`] or use [`EngineConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Window mapping, resampling and randomness.
    #[serde(default)]
    pub engine: EngineSection,
    /// Noise injection bounds.
    #[serde(default)]
    pub noise: NoiseConfig,
    /// Location of the reference-year trace files.
    #[serde(default)]
    pub traces: TracesConfig,
}

/// Window mapping, resampling and randomness.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    /// Calendar year of the bundled traces.
    pub reference_year: i32,
    /// Resampling cadence in minutes (must divide 1440).
    pub cadence_minutes: u32,
    /// Handling of Feb 29 when the reference year has none.
    pub leap_day: LeapDayPolicy,
    /// Noise seed; `None` draws from OS entropy on every request.
    pub seed: Option<u64>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            reference_year: 2010,
            cadence_minutes: 15,
            leap_day: LeapDayPolicy::Clamp,
            seed: None,
        }
    }
}

/// Noise injection bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NoiseConfig {
    /// Exclusive upper bound of the integer offset added to non-zero readings.
    pub max_offset: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { max_offset: 50 }
    }
}

/// Location of the reference-year trace files.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracesConfig {
    /// Root directory; tables live at `<data_dir>/<family>/<family>_l<level>.csv`.
    pub data_dir: PathBuf,
}

impl Default for TracesConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"engine.cadence_minutes"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl EngineConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Resampling cadence, if `engine.cadence_minutes` is valid.
    pub fn cadence(&self) -> Option<Cadence> {
        Cadence::from_minutes(self.engine.cadence_minutes)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let e = &self.engine;

        if self.cadence().is_none() {
            errors.push(ConfigError {
                field: "engine.cadence_minutes".into(),
                message: format!(
                    "must be > 0 and divide 1440 evenly, got {}",
                    e.cadence_minutes
                ),
            });
        }
        if !(1..=9998).contains(&e.reference_year) {
            errors.push(ConfigError {
                field: "engine.reference_year".into(),
                message: format!("must be in 1..=9998, got {}", e.reference_year),
            });
        }
        if self.traces.data_dir.as_os_str().is_empty() {
            errors.push(ConfigError {
                field: "traces.data_dir".into(),
                message: "must not be empty".into(),
            });
        }

        errors
    }
}
