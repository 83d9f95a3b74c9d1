//! Engine configuration.
//!
//! # Responsibility
//! - Hold the tunable limits, defaults and spiral geometry used by the engine.
//! - Load overrides from TOML; every field falls back to its default.
//!
//! # Invariants
//! - A config is only handed to the engine after `validate()` succeeds.
//! - Text and tag limits never exceed what the entries table can store.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DAILY_LIMIT: usize = 5;
pub const DEFAULT_MAX_TEXT_CHARS: usize = 240;
pub const DEFAULT_MAX_TAGS: usize = 5;
pub const DEFAULT_MAX_SYMBOL_CHARS: usize = 2;
pub const DEFAULT_SYMBOL: &str = "✶";
pub const UNTAGGED_TAG: &str = "untagged";
/// Longest text the `entries` table accepts (`CHECK length(text)`).
pub const MAX_STORED_TEXT_CHARS: usize = 240;
/// Most tags a persisted row may carry.
pub const MAX_STORED_TAGS: usize = 5;
const DEFAULT_RESONATE_MAX_ATTEMPTS: u32 = 3;

/// Per-entry and per-day limits applied on submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryLimits {
    pub daily_limit: usize,
    pub max_text_chars: usize,
    pub max_tags: usize,
    pub max_symbol_chars: usize,
    pub default_symbol: String,
    pub untagged_tag: String,
}

impl Default for EntryLimits {
    fn default() -> Self {
        Self {
            daily_limit: DEFAULT_DAILY_LIMIT,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_tags: DEFAULT_MAX_TAGS,
            max_symbol_chars: DEFAULT_MAX_SYMBOL_CHARS,
            default_symbol: DEFAULT_SYMBOL.to_string(),
            untagged_tag: UNTAGGED_TAG.to_string(),
        }
    }
}

/// Archimedean spiral placement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralGeometry {
    pub center_x: f64,
    pub center_y: f64,
    /// Radians added per position.
    pub angle_step: f64,
    /// Units added per position.
    pub radius_step: f64,
}

impl Default for SpiralGeometry {
    fn default() -> Self {
        Self {
            center_x: 350.0,
            center_y: 300.0,
            angle_step: 0.6,
            radius_step: 32.0,
        }
    }
}

/// File logging settings consumed by `init_logging`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Falls back to `default_log_level()` when unset.
    pub level: Option<String>,
    /// Absolute directory; file logging stays off when unset.
    pub dir: Option<PathBuf>,
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    #[serde(flatten)]
    pub limits: EntryLimits,
    /// Pins identity to `guest` and ignores the identity provider.
    pub guest_mode: bool,
    /// Compare-and-set attempts per resonate call.
    pub resonate_max_attempts: u32,
    pub spiral: SpiralGeometry,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: EntryLimits::default(),
            guest_mode: false,
            resonate_max_attempts: DEFAULT_RESONATE_MAX_ATTEMPTS,
            spiral: SpiralGeometry::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = &self.limits;
        if limits.daily_limit == 0 {
            return Err(ConfigError::Invalid("daily_limit must be positive"));
        }
        if !(1..=MAX_STORED_TEXT_CHARS).contains(&limits.max_text_chars) {
            return Err(ConfigError::Invalid("max_text_chars must be within 1..=240"));
        }
        if !(1..=MAX_STORED_TAGS).contains(&limits.max_tags) {
            return Err(ConfigError::Invalid("max_tags must be within 1..=5"));
        }
        if limits.max_symbol_chars == 0 {
            return Err(ConfigError::Invalid("max_symbol_chars must be positive"));
        }
        if limits.default_symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("default_symbol must not be blank"));
        }
        let sentinel = limits.untagged_tag.as_str();
        if sentinel.is_empty() || sentinel.trim() != sentinel || sentinel.to_lowercase() != sentinel {
            return Err(ConfigError::Invalid(
                "untagged_tag must be non-empty, trimmed and lower-case",
            ));
        }
        if self.resonate_max_attempts == 0 {
            return Err(ConfigError::Invalid("resonate_max_attempts must be positive"));
        }
        let spiral = &self.spiral;
        if ![spiral.center_x, spiral.center_y, spiral.angle_step, spiral.radius_step]
            .iter()
            .all(|value| value.is_finite())
        {
            return Err(ConfigError::Invalid("spiral geometry must be finite"));
        }
        Ok(())
    }
}
