//! Core Types for blockwatch-sim
//!
//! Per-block records with ground truth, and the confusion-matrix summary
//! computed over a finished experiment.

use blockwatch::BlockReport;
use serde::Serialize;

// ============================================================================
// Per-block output
// ============================================================================

/// One simulated block: its ground truth label and what the monitor said.
#[derive(Serialize, Debug, Clone)]
pub struct BlockRecord {
    pub index: u64,
    /// Ground truth: was this block generated by an anomalous scenario?
    pub label: bool,
    pub scenario: String,
    #[serde(flatten)]
    pub report: BlockReport,
    /// Whether the detector was scoring (not warming up) for this block
    pub baseline_ready: bool,
}

impl BlockRecord {
    pub fn statistical_alert(&self) -> bool {
        self.report.decision.is_anomaly
    }

    pub fn rule_alert(&self) -> bool {
        self.report.rule_decision.rule_alert
    }

    pub fn combined_alert(&self) -> bool {
        self.report.any_alert()
    }
}

// ============================================================================
// Metrics
// ============================================================================

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct DetectorMetrics {
    pub name: String,
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl DetectorMetrics {
    /// Build from `(ground_truth, predicted)` pairs.
    pub fn from_outcomes(name: &str, outcomes: impl IntoIterator<Item = (bool, bool)>) -> Self {
        let mut m = Self {
            name: name.to_string(),
            ..Default::default()
        };
        for (truth, predicted) in outcomes {
            match (truth, predicted) {
                (true, true) => m.true_positives += 1,
                (false, true) => m.false_positives += 1,
                (false, false) => m.true_negatives += 1,
                (true, false) => m.false_negatives += 1,
            }
        }
        let (precision, recall, f1) =
            calculate_metrics(m.true_positives, m.false_positives, m.false_negatives);
        m.precision = precision;
        m.recall = recall;
        m.f1_score = f1;
        m
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ExperimentSummary {
    pub total_blocks: u64,
    pub labeled_anomalies: u64,
    /// Blocks scored after the baseline froze
    pub scored_blocks: u64,
    pub statistical: DetectorMetrics,
    pub rules: DetectorMetrics,
    pub combined: DetectorMetrics,
}

impl ExperimentSummary {
    /// Counts over every block, warm-up included: a block the detector could
    /// not score is a negative prediction.
    pub fn from_records(records: &[BlockRecord]) -> Self {
        Self {
            total_blocks: records.len() as u64,
            labeled_anomalies: records.iter().filter(|r| r.label).count() as u64,
            scored_blocks: records.iter().filter(|r| r.baseline_ready).count() as u64,
            statistical: DetectorMetrics::from_outcomes(
                "statistical",
                records.iter().map(|r| (r.label, r.statistical_alert())),
            ),
            rules: DetectorMetrics::from_outcomes(
                "rules",
                records.iter().map(|r| (r.label, r.rule_alert())),
            ),
            combined: DetectorMetrics::from_outcomes(
                "combined",
                records.iter().map(|r| (r.label, r.combined_alert())),
            ),
        }
    }
}

/// Precision, recall and F1 from confusion counts; 0.0 where undefined.
pub fn calculate_metrics(tp: u64, fp: u64, fn_: u64) -> (f64, f64, f64) {
    let precision = if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        0.0
    };
    let recall = if tp + fn_ > 0 {
        tp as f64 / (tp + fn_) as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    (precision, recall, f1)
}
