//! Analysis configuration
//!
//! Window sizes, thresholds and policies are carried in explicit structures and
//! handed to each stage. Every field has a serde default, so a partial JSON file
//! only overrides what it names.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Default rolling window for speed statistics (samples)
pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Default forward window for change detection and transition extraction (samples)
pub const DEFAULT_FORWARD_WINDOW: usize = 20;

/// Default percentile of the local `abs_diff_std` distribution
pub const DEFAULT_PERCENTILE: f64 = 95.0;

/// Default matching tolerance between consecutive vehicles (time units)
pub const DEFAULT_MATCH_TOLERANCE: f64 = 20.0;

/// Default speed clip bounds used by the cleaner
pub const DEFAULT_MIN_SPEED: f64 = 0.0;
pub const DEFAULT_MAX_SPEED: f64 = 50.0;

/// What to do with the last detection of each vehicle.
///
/// The final rising edge of a recording usually comes from the forward window
/// running off the end of the data rather than from a real transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingDetection {
    /// Remove the last detection time of every vehicle
    #[default]
    Drop,
    /// Report every detection time
    Keep,
}

/// Parameters of the detection pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Statistics engine window (samples)
    pub window_size: usize,
    /// Change detector / transition extractor window (samples)
    pub forward_window: usize,
    /// Percentile (0-100) compared against the global std
    pub percentile: f64,
    /// Maximum delay accepted when matching a follower to its predecessor
    pub match_tolerance: f64,
    pub trailing_detection: TrailingDetection,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            forward_window: DEFAULT_FORWARD_WINDOW,
            percentile: DEFAULT_PERCENTILE,
            match_tolerance: DEFAULT_MATCH_TOLERANCE,
            trailing_detection: TrailingDetection::Drop,
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.window_size == 0 {
            return Err(AnalysisError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }
        if self.forward_window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "forward_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(AnalysisError::InvalidConfig(format!(
                "percentile must be within 0-100, got {}",
                self.percentile
            )));
        }
        if !self.match_tolerance.is_finite() || self.match_tolerance < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "match_tolerance must be a non-negative number, got {}",
                self.match_tolerance
            )));
        }
        Ok(())
    }
}

/// Parameters of the cleaning stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Lower clip bound for speeds
    pub min_speed: f64,
    /// Upper clip bound for speeds
    pub max_speed: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }
}

impl CleaningConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !self.min_speed.is_finite() || !self.max_speed.is_finite() {
            return Err(AnalysisError::InvalidConfig(
                "speed clip bounds must be finite".to_string(),
            ));
        }
        if self.min_speed > self.max_speed {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_speed ({}) exceeds max_speed ({})",
                self.min_speed, self.max_speed
            )));
        }
        Ok(())
    }
}

/// Full configuration of a processing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detection: DetectionConfig,
    pub cleaning: CleaningConfig,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.detection.validate()?;
        self.cleaning.validate()
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(self).map_err(AnalysisError::JsonError)
    }
}
