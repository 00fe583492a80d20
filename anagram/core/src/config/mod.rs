//! TOML Configuration File Support
//!
//! Centralized configuration for the anagram board, read from a TOML file at
//! `~/.config/crossie/anagrams.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/crossie/anagrams.toml` (typically `~/.config/crossie/anagrams.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! seed = 42
//!
//! [animation]
//! duration_ms = 100
//! move_tick_ms = 10
//! cancel_superseded = false
//!
//! [grid]
//! cell_edge = 120
//! tile_edge = 80
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::AnimationConfig;
use crate::layout::generator::GridConfig;

/// Environment variable names read by [`load_config`]
pub mod env {
    /// Animation duration in milliseconds
    pub const ANIMATION_MS: &str = "ANAGRAM_ANIMATION_MS";
    /// Move sampling tick in milliseconds
    pub const MOVE_TICK_MS: &str = "ANAGRAM_MOVE_TICK_MS";
    /// Cancel in-flight animations on re-target (`1/true/yes/on`, `0/false/no/off`)
    pub const CANCEL_SUPERSEDED: &str = "ANAGRAM_CANCEL_SUPERSEDED";
    /// Grid cell edge in pixels
    pub const CELL_EDGE: &str = "ANAGRAM_CELL_EDGE";
    /// Tile edge in pixels
    pub const TILE_EDGE: &str = "ANAGRAM_TILE_EDGE";
    /// Layout RNG seed
    pub const SEED: &str = "ANAGRAM_SEED";
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Animation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Length of each effect in milliseconds
    pub duration_ms: Option<u64>,

    /// Move sampling tick in milliseconds
    pub move_tick_ms: Option<u64>,

    /// Cancel a tile's in-flight animations before re-targeting it
    pub cancel_superseded: Option<bool>,
}

/// Grid section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridToml {
    /// Grid cell edge in pixels
    pub cell_edge: Option<i32>,

    /// Rendered tile edge in pixels
    pub tile_edge: Option<i32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardToml {
    /// Fixed seed for random layouts
    pub seed: Option<u64>,

    /// Animation configuration section
    pub animation: AnimationToml,

    /// Grid configuration section
    pub grid: GridToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the anagram board
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct BoardConfig {
    /// Animation timing
    pub animation: AnimationConfig,

    /// Grid geometry for random layouts
    pub grid: GridConfig,

    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            animation: AnimationConfig::default(),
            grid: GridConfig::default(),
            seed: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl BoardConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero duration or tick,
    /// or a tile edge outside `1..=cell_edge`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation.duration.is_zero() {
            return Err(ConfigError::ValidationError(
                "animation duration must be greater than zero".to_string(),
            ));
        }
        if self.animation.move_tick.is_zero() {
            return Err(ConfigError::ValidationError(
                "move tick must be greater than zero".to_string(),
            ));
        }
        if self.grid.tile_edge <= 0 || self.grid.tile_edge > self.grid.cell_edge {
            return Err(ConfigError::ValidationError(format!(
                "tile edge {} must be in 1..={}",
                self.grid.tile_edge, self.grid.cell_edge
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/crossie/anagrams.toml` or
/// `~/.config/crossie/anagrams.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("crossie").join("anagrams.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] after.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<BoardConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// If `path` is `None`, only defaults and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<BoardConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment values through `lookup`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(
    path: Option<PathBuf>,
    lookup: F,
) -> Result<BoardConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = BoardConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: BoardToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, lookup);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut BoardConfig, toml: &BoardToml) {
    if let Some(seed) = toml.seed {
        config.seed = Some(seed);
    }

    if let Some(ms) = toml.animation.duration_ms {
        config.animation.duration = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.animation.move_tick_ms {
        config.animation.move_tick = Duration::from_millis(ms);
    }
    if let Some(cancel) = toml.animation.cancel_superseded {
        config.animation.cancel_superseded = cancel;
    }

    if let Some(edge) = toml.grid.cell_edge {
        config.grid.cell_edge = edge;
    }
    if let Some(edge) = toml.grid.tile_edge {
        config.grid.tile_edge = edge;
    }
}

/// Parse a boolean environment value (`1/0`, `true/false`, `yes/no`, `on/off`)
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Apply environment variable overrides to the config
///
/// Values that do not parse are ignored with a warning.
fn apply_env_config<F>(config: &mut BoardConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let parsed = |key: &str| -> Option<u64> {
        let raw = lookup(key)?;
        match raw.trim().parse::<u64>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(
                    var = key,
                    value = %raw,
                    error = %e,
                    "Ignoring unparsable environment value"
                );
                None
            }
        }
    };
    let flag = |key: &str| -> Option<bool> {
        let raw = lookup(key)?;
        let value = parse_flag(&raw);
        if value.is_none() {
            tracing::warn!(
                var = key,
                value = %raw,
                "Ignoring unparsable boolean environment value"
            );
        }
        value
    };

    if let Some(ms) = parsed(env::ANIMATION_MS) {
        config.animation.duration = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parsed(env::MOVE_TICK_MS) {
        config.animation.move_tick = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(cancel) = flag(env::CANCEL_SUPERSEDED) {
        config.animation.cancel_superseded = cancel;
        config.source = ConfigSource::Env;
    }
    if let Some(edge) = parsed(env::CELL_EDGE).and_then(|v| i32::try_from(v).ok()) {
        config.grid.cell_edge = edge;
        config.source = ConfigSource::Env;
    }
    if let Some(edge) = parsed(env::TILE_EDGE).and_then(|v| i32::try_from(v).ok()) {
        config.grid.tile_edge = edge;
        config.source = ConfigSource::Env;
    }
    if let Some(seed) = parsed(env::SEED) {
        config.seed = Some(seed);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides,
/// then call [`BoardConfig::validate`] again.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Layout seed override
    pub seed: Option<u64>,
    /// Animation duration override (milliseconds)
    pub duration_ms: Option<u64>,
    /// Superseded-animation cancellation override
    pub cancel_superseded: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set animation duration override
    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// Set cancellation override
    #[must_use]
    pub fn with_cancel_superseded(mut self, cancel: bool) -> Self {
        self.cancel_superseded = Some(cancel);
        self
    }

    /// Whether any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seed.is_none() && self.duration_ms.is_none() && self.cancel_superseded.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut BoardConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(ms) = self.duration_ms {
            config.animation.duration = Duration::from_millis(ms);
        }
        if let Some(cancel) = self.cancel_superseded {
            config.animation.cancel_superseded = cancel;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
