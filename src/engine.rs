use crate::config::MonitorConfig;
use crate::detector::{Decision, ZScoreDetector};
use crate::features::{self, FeatureVector};
use crate::ledger::Block;
use crate::rules::{RuleChecker, RuleDecision};
use serde::Serialize;

// --- Output ---

/// Both verdicts for one block, plus the features they were computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReport {
    pub features: FeatureVector,
    pub decision: Decision,
    pub rule_decision: RuleDecision,
}

impl BlockReport {
    /// True when either strategy raised an alarm.
    pub fn any_alert(&self) -> bool {
        self.decision.is_anomaly || self.rule_decision.rule_alert
    }
}

// --- The Engine ---

/// Runs extraction, the statistical detector and the rule checker for each
/// appended block. Blocks must be fed in ledger order; the detector state is
/// owned here and mutated only through `&mut self`.
#[derive(Debug, Clone)]
pub struct BlockMonitor {
    detector: ZScoreDetector,
    rules: RuleChecker,
}

impl BlockMonitor {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            detector: ZScoreDetector::from_config(&config.detector),
            rules: RuleChecker::from_config(&config.rules),
        }
    }

    pub fn observe(&mut self, block: &Block, previous: Option<&Block>) -> BlockReport {
        let features = features::extract(block, previous);
        self.observe_features(block.index(), features)
    }

    /// Same as [`observe`](Self::observe) for callers that already hold the features.
    pub fn observe_features(&mut self, block_index: u64, features: FeatureVector) -> BlockReport {
        let decision = self.detector.process(block_index, &features);
        let rule_decision = self.rules.check(&features);

        BlockReport {
            features,
            decision,
            rule_decision,
        }
    }

    pub fn detector(&self) -> &ZScoreDetector {
        &self.detector
    }

    pub fn rules(&self) -> &RuleChecker {
        &self.rules
    }
}

impl Default for BlockMonitor {
    fn default() -> Self {
        Self::new(&MonitorConfig::default())
    }
}
