//! Engine configuration.
//!
//! Loaded from a sparse `pixfit.toml` merged over stock defaults. Every key is
//! optional; unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! backend = "rust"             # "rust" (resize, thumbnail) or "extended" (all operations)
//! max_buffer_size = 8192       # Working-area ceiling in pixels per axis; <= 0 means default
//! output_capacity = 52428800   # Encoded output ceiling in bytes (50 MiB)
//! filter = "lanczos3"          # nearest | triangle | catmull-rom | gaussian | lanczos3
//! quality = 90                 # JPEG/AVIF quality (1-100)
//!
//! [concurrency]
//! max_in_flight = 4            # Parallel transforms in batch mode (omit for auto = CPU cores)
//! ```

use crate::engine::{
    BackendKind, DEFAULT_MAX_BUFFER_SIZE, DEFAULT_OUTPUT_CAPACITY, EngineSettings, Filter,
    ImageEngine, Quality, build_engine, pipeline,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE: &str = "pixfit.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `pixfit.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Which backend to build.
    pub backend: BackendKind,
    /// Working-area ceiling in pixels per axis. Values `<= 0` mean default.
    pub max_buffer_size: i64,
    /// Encoded output ceiling in bytes.
    pub output_capacity: usize,
    /// Default resampling filter.
    pub filter: Filter,
    /// Default JPEG/AVIF quality.
    pub quality: u32,
    /// Batch concurrency settings.
    pub concurrency: ConcurrencyConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            max_buffer_size: i64::from(DEFAULT_MAX_BUFFER_SIZE),
            output_capacity: DEFAULT_OUTPUT_CAPACITY,
            filter: Filter::default(),
            quality: Quality::default().value(),
            concurrency: ConcurrencyConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.output_capacity == 0 {
            return Err(ConfigError::Validation(
                "output_capacity must be greater than zero".into(),
            ));
        }
        if self.concurrency.max_in_flight == Some(0) {
            return Err(ConfigError::Validation(
                "concurrency.max_in_flight must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The fixed settings handed to the engine.
    pub fn settings(&self) -> EngineSettings {
        if self.max_buffer_size <= 0 {
            log::warn!(
                "max_buffer_size = {} is not positive, using {DEFAULT_MAX_BUFFER_SIZE}",
                self.max_buffer_size
            );
        }
        EngineSettings {
            max_buffer_size: pipeline::effective_max_buffer_size(self.max_buffer_size),
            output_capacity: self.output_capacity,
            filter: self.filter,
            quality: self.quality(),
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// Build the configured engine.
    pub fn build_engine(&self) -> Box<dyn ImageEngine> {
        build_engine(self.backend, self.settings())
    }
}

/// Batch concurrency settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConcurrencyConfig {
    /// Maximum number of transforms in flight at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_in_flight: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ConcurrencyConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_in_flight.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(EngineConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<EngineConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EngineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    log::debug!("loaded config from {}", path.display());
    resolve_config(Some(value))
}

/// Load `pixfit.toml` from `dir`, or stock defaults when there is none.
pub fn load_config(dir: &Path) -> Result<EngineConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `pixfit.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pixfit configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Backend: "rust" supports resize and thumbnail; "extended" adds rotate,
# flip and fit.
backend = "rust"

# Working-area ceiling in pixels per axis. Sources or targets larger than
# this on either axis are rejected before any pixels are decoded.
# Values <= 0 fall back to the default.
max_buffer_size = 8192

# Encoded output ceiling in bytes (50 MiB). Larger results fail instead of
# being truncated.
output_capacity = 52428800

# Resampling filter: nearest, triangle, catmull-rom, gaussian, lanczos3.
filter = "lanczos3"

# JPEG/AVIF encoding quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Concurrency (batch mode)
# ---------------------------------------------------------------------------
[concurrency]
# Maximum transforms in flight. Omit to use one per CPU core; larger values
# are clamped to the core count.
# max_in_flight = 4
"##
}
