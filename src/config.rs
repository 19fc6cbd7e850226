//! Detector and rule configuration.
//!
//! Every struct derives serde with `#[serde(default)]`, so a JSON file only
//! needs the keys it wants to override.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of blocks collected before the baseline freezes.
pub const DEFAULT_BASELINE_SIZE: usize = 10;
/// Default z-score threshold for a detector used on its own.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Statistical detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Blocks to accumulate before computing the one-shot baseline
    pub baseline_size: usize,
    /// Absolute z-score above which a feature is flagged
    pub z_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            baseline_size: DEFAULT_BASELINE_SIZE,
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.baseline_size == 0 {
            return Err(Error::invalid_config("baseline_size", "must be at least 1"));
        }
        if !self.z_threshold.is_finite() || self.z_threshold < 0.0 {
            return Err(Error::invalid_config(
                "z_threshold",
                format!("must be a non-negative finite number, got {}", self.z_threshold),
            ));
        }
        Ok(())
    }
}

/// Fixed thresholds for the rule checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub max_single_tx_amount: f64,
    pub max_block_total_amount: f64,
    /// Minimum seconds between consecutive blocks (0.0 deltas are exempt)
    pub min_time_delta: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_single_tx_amount: 2000.0,
            max_block_total_amount: 5000.0,
            min_time_delta: 0.02,
        }
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<()> {
        positive("max_single_tx_amount", self.max_single_tx_amount)?;
        positive("max_block_total_amount", self.max_block_total_amount)?;
        if !self.min_time_delta.is_finite() || self.min_time_delta < 0.0 {
            return Err(Error::invalid_config(
                "min_time_delta",
                format!("must be non-negative, got {}", self.min_time_delta),
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(
            field,
            format!("must be greater than 0, got {}", value),
        ))
    }
}

/// Combined configuration for a [`crate::engine::BlockMonitor`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub detector: DetectorConfig,
    pub rules: RuleConfig,
}

impl MonitorConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.rules.validate()
    }
}
