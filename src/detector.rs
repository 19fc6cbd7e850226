//! Streaming z-score detector.
//!
//! Collects features until the baseline freezes, then scores every later
//! block against it. Each instance owns its own history, so any number of
//! detectors can run side by side without sharing state.

use crate::algo::baseline::{BaselineEstimator, BaselinePhase, BaselineStats, Observation};
use crate::config::DetectorConfig;
use crate::features::{Feature, FeatureVector};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Why a [`Decision`] came out the way it did.
#[derive(Debug, Clone, PartialEq)]
pub enum DecisionReason {
    InsufficientData { collected: usize, required: usize },
    BaselineComputed,
    WithinNormalRange,
    Anomalous { features: Vec<Feature>, threshold: f64 },
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReason::InsufficientData { collected, required } => {
                write!(f, "insufficient data for baseline ({}/{} blocks)", collected, required)
            }
            DecisionReason::BaselineComputed => f.write_str("baseline computed; no detection yet"),
            DecisionReason::WithinNormalRange => f.write_str("within normal range"),
            DecisionReason::Anomalous { features, threshold } => {
                let names: Vec<&str> = features.iter().map(|f| f.name()).collect();
                write!(
                    f,
                    "anomalous features: {} (z-score threshold = {})",
                    names.join(", "),
                    threshold
                )
            }
        }
    }
}

impl Serialize for DecisionReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Statistical verdict for one block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub block_index: u64,
    pub is_anomaly: bool,
    /// Empty until the baseline is in the scoring phase.
    pub feature_z_scores: BTreeMap<Feature, f64>,
    pub reason: DecisionReason,
}

impl Decision {
    fn quiet(block_index: u64, reason: DecisionReason) -> Self {
        Self {
            block_index,
            is_anomaly: false,
            feature_z_scores: BTreeMap::new(),
            reason,
        }
    }

    pub fn z_score(&self, feature: Feature) -> Option<f64> {
        self.feature_z_scores.get(&feature).copied()
    }
}

#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    z_threshold: f64,
    baseline: BaselineEstimator,
}

impl ZScoreDetector {
    pub fn new(baseline_size: usize, z_threshold: f64) -> Self {
        Self {
            z_threshold,
            baseline: BaselineEstimator::new(baseline_size),
        }
    }

    pub fn from_config(config: &DetectorConfig) -> Self {
        Self::new(config.baseline_size, config.z_threshold)
    }

    /// Feed one block's features and decide.
    pub fn process(&mut self, block_index: u64, features: &FeatureVector) -> Decision {
        let decision = match self.baseline.observe(features) {
            Observation::Collecting { collected, required } => Decision::quiet(
                block_index,
                DecisionReason::InsufficientData { collected, required },
            ),
            Observation::BaselineComputed(_) => {
                Decision::quiet(block_index, DecisionReason::BaselineComputed)
            }
            Observation::Ready(stats) => self.score(block_index, features, &stats),
        };

        debug!(
            block = block_index,
            anomaly = decision.is_anomaly,
            reason = %decision.reason,
            "statistical decision"
        );
        decision
    }

    fn score(&self, block_index: u64, features: &FeatureVector, stats: &BaselineStats) -> Decision {
        let feature_z_scores: BTreeMap<Feature, f64> = stats
            .iter()
            .map(|(feature, s)| (feature, s.z_score(features.get(feature))))
            .collect();

        let anomalous: Vec<Feature> = feature_z_scores
            .iter()
            .filter(|(_, z)| z.abs() > self.z_threshold)
            .map(|(feature, _)| *feature)
            .collect();

        let (is_anomaly, reason) = if anomalous.is_empty() {
            (false, DecisionReason::WithinNormalRange)
        } else {
            (
                true,
                DecisionReason::Anomalous {
                    features: anomalous,
                    threshold: self.z_threshold,
                },
            )
        };

        Decision {
            block_index,
            is_anomaly,
            feature_z_scores,
            reason,
        }
    }

    pub fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    pub fn phase(&self) -> &BaselinePhase {
        self.baseline.phase()
    }

    pub fn baseline(&self) -> Option<&BaselineStats> {
        self.baseline.baseline()
    }

    pub fn is_baseline_ready(&self) -> bool {
        self.baseline.phase().is_ready()
    }

    /// Samples seen so far, equal to the number of `process` calls.
    pub fn history_len(&self) -> usize {
        self.baseline.history().len()
    }

    pub fn estimator(&self) -> &BaselineEstimator {
        &self.baseline
    }
}

impl Default for ZScoreDetector {
    fn default() -> Self {
        Self::from_config(&DetectorConfig::default())
    }
}
