//! Engine configuration
//!
//! Loaded from TOML. Every section and field is optional; omitted values
//! take the defaults below.
//!
//! ```toml
//! [scoring]
//! modified_threshold = 10.0
//! fabricated_threshold = 40.0
//!
//! [diff]
//! granularity = "word"
//!
//! [layout]
//! horizontal_spacing = 300.0
//! vertical_spacing = 150.0
//!
//! [session]
//! channel_capacity = 256
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diff::Granularity;
use crate::errors::{MutraceError, Result};

pub const DEFAULT_MODIFIED_THRESHOLD: f64 = 10.0;
pub const DEFAULT_FABRICATED_THRESHOLD: f64 = 40.0;
pub const DEFAULT_HORIZONTAL_SPACING: f64 = 300.0;
pub const DEFAULT_VERTICAL_SPACING: f64 = 150.0;
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Score cut-offs for [`MutationType`](crate::model::MutationType)
///
/// `score >= fabricated_threshold` is FABRICATED, `score >= modified_threshold`
/// is MODIFIED, anything lower is ORIGINAL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringThresholds {
    pub modified_threshold: f64,
    pub fabricated_threshold: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            modified_threshold: DEFAULT_MODIFIED_THRESHOLD,
            fabricated_threshold: DEFAULT_FABRICATED_THRESHOLD,
        }
    }
}

impl ScoringThresholds {
    /// Check `0 <= modified <= fabricated <= 100`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the bounds are out of order or out of range.
    pub fn validate(&self) -> Result<()> {
        let ok = self.modified_threshold.is_finite()
            && self.fabricated_threshold.is_finite()
            && 0.0 <= self.modified_threshold
            && self.modified_threshold <= self.fabricated_threshold
            && self.fabricated_threshold <= 100.0;
        if ok {
            Ok(())
        } else {
            Err(MutraceError::InvalidConfig {
                reason: format!(
                    "thresholds must satisfy 0 <= modified ({}) <= fabricated ({}) <= 100",
                    self.modified_threshold, self.fabricated_threshold
                ),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    pub granularity: Granularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Distance between adjacent leaf slots
    pub horizontal_spacing: f64,
    /// Distance between depth levels
    pub vertical_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: DEFAULT_HORIZONTAL_SPACING,
            vertical_spacing: DEFAULT_VERTICAL_SPACING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Bound of the viewer's internal event queue
    pub channel_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub scoring: ScoringThresholds,
    pub diff: DiffConfig,
    pub layout: LayoutConfig,
    pub session: SessionConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on syntax errors, unknown keys or invalid values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| MutraceError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| MutraceError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        let spacing_ok = |v: f64| v.is_finite() && v > 0.0;
        if !spacing_ok(self.layout.horizontal_spacing) || !spacing_ok(self.layout.vertical_spacing)
        {
            return Err(MutraceError::InvalidConfig {
                reason: "layout spacing must be positive".to_string(),
            });
        }
        if self.session.channel_capacity == 0 {
            return Err(MutraceError::InvalidConfig {
                reason: "session.channel_capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
