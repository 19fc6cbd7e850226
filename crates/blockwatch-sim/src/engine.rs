//! Experiment Driver
//!
//! Builds a synthetic chain block by block and feeds each block to a
//! [`BlockMonitor`], keeping the ground truth label next to both verdicts.
//!
//! ```text
//!  label ~ Bernoulli(p) ──► scenario ──► transactions + interval
//!                                               │
//!                        logical clock += interval
//!                                               ▼
//!                         Blockchain::add_block_at ──► BlockMonitor::observe
//!                                                               │
//!                                                               ▼
//!                                                          BlockRecord
//! ```
//!
//! Time never sleeps: block timestamps come from a logical clock, so a
//! seeded experiment is reproducible and runs instantly.

use crate::core::{BlockRecord, ExperimentSummary};
use crate::scenarios::{self, BlockScenario};
use blockwatch::{
    Blockchain, BlockMonitor, DetectorConfig, Error, MonitorConfig, Result, RuleConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Experiment parameters
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ExperimentConfig {
    pub num_blocks: usize,
    /// Chance that any given block is generated by the anomalous scenario
    pub anomaly_probability: f64,
    pub baseline_size: usize,
    pub z_threshold: f64,
    pub rules: RuleConfig,
    /// RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
    /// Genesis timestamp; `None` uses the current time
    pub start_timestamp: Option<f64>,
    pub normal_scenario: String,
    pub anomaly_scenario: String,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            num_blocks: 50,
            anomaly_probability: 0.2,
            baseline_size: 10,
            z_threshold: 1.5,
            rules: RuleConfig::default(),
            seed: None,
            start_timestamp: None,
            normal_scenario: "normal".to_string(),
            anomaly_scenario: "suspicious".to_string(),
        }
    }
}

impl ExperimentConfig {
    /// Load from a JSON file over [`ExperimentConfig::default`] and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_over(&Self::default(), &content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the keys present in `json` on top of `base`. Nested objects
    /// (`rules`) merge key by key; an explicit `null` clears an optional field.
    /// The result is not validated.
    pub fn from_json_over(base: &Self, json: &str) -> Result<Self> {
        let overlay: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(base)?;
        merge_json(&mut merged, overlay);
        Ok(serde_json::from_value(merged)?)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            detector: DetectorConfig {
                baseline_size: self.baseline_size,
                z_threshold: self.z_threshold,
            },
            rules: self.rules.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.anomaly_probability) {
            return Err(Error::invalid_config(
                "anomaly_probability",
                format!("must be within [0, 1], got {}", self.anomaly_probability),
            ));
        }
        if let Some(ts) = self.start_timestamp {
            if !ts.is_finite() {
                return Err(Error::invalid_config("start_timestamp", "must be finite"));
            }
        }
        for (field, name) in [
            ("normal_scenario", &self.normal_scenario),
            ("anomaly_scenario", &self.anomaly_scenario),
        ] {
            if scenarios::create_scenario(name).is_none() {
                return Err(Error::invalid_config(field, format!("unknown scenario '{}'", name)));
            }
        }
        self.monitor_config().validate()
    }
}

/// Everything a finished experiment produced
#[derive(Serialize, Debug, Clone)]
pub struct ExperimentReport {
    pub config: ExperimentConfig,
    pub records: Vec<BlockRecord>,
    pub chain_valid: bool,
    pub summary: ExperimentSummary,
}

pub struct Experiment {
    config: ExperimentConfig,
    rng: StdRng,
    chain: Blockchain,
    monitor: BlockMonitor,
    normal: Box<dyn BlockScenario>,
    anomalous: Box<dyn BlockScenario>,
    /// Logical clock (seconds), advanced by each block's interval
    clock: f64,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        config.validate()?;

        let normal = lookup_scenario("normal_scenario", &config.normal_scenario)?;
        let anomalous = lookup_scenario("anomaly_scenario", &config.anomaly_scenario)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let chain = match config.start_timestamp {
            Some(ts) => Blockchain::starting_at(ts),
            None => Blockchain::new(),
        };
        let clock = chain.last_block().timestamp();
        let monitor = BlockMonitor::new(&config.monitor_config());

        Ok(Self {
            config,
            rng,
            chain,
            monitor,
            normal,
            anomalous,
            clock,
        })
    }

    /// Generate, append and analyse one block.
    pub fn step(&mut self) -> BlockRecord {
        let label = self.rng.random_bool(self.config.anomaly_probability);
        let scenario = if label {
            &mut self.anomalous
        } else {
            &mut self.normal
        };
        let transactions = scenario.transactions(&mut self.rng);
        let interval = scenario.interval(&mut self.rng);
        let scenario_name = scenario.name().to_string();

        self.clock += interval;
        self.chain.add_block_at(transactions, self.clock);

        let block = self.chain.last_block();
        let previous = self
            .chain
            .len()
            .checked_sub(2)
            .and_then(|i| self.chain.get(i));
        let report = self.monitor.observe(block, previous);

        debug!(
            index = block.index(),
            label,
            scenario = %scenario_name,
            statistical = report.decision.is_anomaly,
            rules = report.rule_decision.rule_alert,
            "block observed"
        );

        BlockRecord {
            index: block.index(),
            label,
            scenario: scenario_name,
            report,
            baseline_ready: self.monitor.detector().is_baseline_ready(),
        }
    }

    /// Run the configured number of blocks, then validate the chain.
    pub fn run(mut self) -> ExperimentReport {
        info!(
            blocks = self.config.num_blocks,
            anomaly_probability = self.config.anomaly_probability,
            baseline_size = self.config.baseline_size,
            z_threshold = self.config.z_threshold,
            "starting experiment"
        );

        let records: Vec<BlockRecord> = (0..self.config.num_blocks).map(|_| self.step()).collect();

        let chain_valid = match self.chain.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "chain failed validation");
                false
            }
        };
        let summary = ExperimentSummary::from_records(&records);

        info!(
            chain_valid,
            statistical_f1 = summary.statistical.f1_score,
            rules_f1 = summary.rules.f1_score,
            "experiment finished"
        );

        ExperimentReport {
            config: self.config,
            records,
            chain_valid,
            summary,
        }
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }
}

fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge_json(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

fn lookup_scenario(field: &str, name: &str) -> Result<Box<dyn BlockScenario>> {
    scenarios::create_scenario(name)
        .ok_or_else(|| Error::invalid_config(field, format!("unknown scenario '{}'", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64, num_blocks: usize, anomaly_probability: f64) -> ExperimentConfig {
        ExperimentConfig {
            num_blocks,
            anomaly_probability,
            seed: Some(seed),
            start_timestamp: Some(1_700_000_000.0),
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ExperimentConfig::default();
        assert_eq!(config.num_blocks, 50);
        assert_eq!(config.anomaly_probability, 0.2);
        assert_eq!(config.baseline_size, 10);
        assert_eq!(config.z_threshold, 1.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_produces_one_record_per_block() {
        let report = Experiment::new(seeded(42, 40, 0.25)).unwrap().run();
        assert_eq!(report.records.len(), 40);
        assert!(report.chain_valid);
        for (i, record) in report.records.iter().enumerate() {
            assert_eq!(record.index, i as u64 + 1);
            assert_eq!(record.report.decision.block_index, record.index);
        }
        assert_eq!(report.summary.total_blocks, 40);
        assert_eq!(report.summary.combined.total(), 40);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let a = Experiment::new(seeded(7, 30, 0.3)).unwrap().run();
        let b = Experiment::new(seeded(7, 30, 0.3)).unwrap().run();
        for (x, y) in a.records.iter().zip(&b.records) {
            assert_eq!(x.label, y.label);
            assert_eq!(x.report, y.report);
        }
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn test_baseline_ready_after_warmup() {
        let report = Experiment::new(seeded(1, 15, 0.2)).unwrap().run();
        for record in &report.records {
            assert_eq!(record.baseline_ready, record.index >= 10);
            if !record.baseline_ready {
                assert!(!record.report.decision.is_anomaly);
            }
        }
        assert_eq!(report.summary.scored_blocks, 6);
    }

    #[test]
    fn test_rules_separate_scenarios() {
        // Suspicious blocks always exceed the block total; normal ones never
        // come close to any rule threshold.
        let report = Experiment::new(seeded(99, 60, 0.5)).unwrap().run();
        for record in &report.records {
            assert_eq!(record.rule_alert(), record.label, "block {}", record.index);
        }
        assert_eq!(report.summary.rules.false_positives, 0);
        assert_eq!(report.summary.rules.false_negatives, 0);
    }

    #[test]
    fn test_all_normal_run() {
        let report = Experiment::new(seeded(5, 20, 0.0)).unwrap().run();
        assert!(report.records.iter().all(|r| !r.label && r.scenario == "normal"));
        assert_eq!(report.summary.labeled_anomalies, 0);
        assert_eq!(report.summary.rules.recall, 0.0);
    }

    #[test]
    fn test_first_block_measured_against_genesis() {
        let mut experiment = Experiment::new(seeded(3, 1, 0.0)).unwrap();
        let record = experiment.step();
        let genesis_ts = experiment.chain().genesis().timestamp();
        let block_ts = experiment.chain().last_block().timestamp();
        assert!((record.report.features.time_delta - (block_ts - genesis_ts)).abs() < 1e-9);
        assert!(record.report.features.time_delta > 0.0);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let err = Experiment::new(ExperimentConfig {
            anomaly_probability: 1.5,
            ..ExperimentConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(
            err,
            Error::InvalidConfig { ref field, .. } if field == "anomaly_probability"
        ));
    }

    #[test]
    fn test_unknown_scenario_rejected() {
        let config = ExperimentConfig {
            anomaly_scenario: "meteor".to_string(),
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_baseline_rejected() {
        let config = ExperimentConfig {
            baseline_size: 0,
            ..ExperimentConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { ref field, .. }) if field == "baseline_size"
        ));
    }

    #[test]
    fn test_json_over_keeps_base_values() {
        let base = seeded(42, 40, 0.25);
        let config = ExperimentConfig::from_json_over(
            &base,
            r#"{"z_threshold": 2.0, "rules": {"min_time_delta": 0.05}}"#,
        )
        .unwrap();
        assert_eq!(config.z_threshold, 2.0);
        assert_eq!(config.rules.min_time_delta, 0.05);
        assert_eq!(config.rules.max_single_tx_amount, 2000.0);
        assert_eq!(config.num_blocks, 40);
        assert_eq!(config.anomaly_probability, 0.25);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.start_timestamp, Some(1_700_000_000.0));
    }

    #[test]
    fn test_json_over_null_clears_seed() {
        let config =
            ExperimentConfig::from_json_over(&seeded(42, 10, 0.1), r#"{"seed": null}"#).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.num_blocks, 10);
    }

    #[test]
    fn test_malformed_json_over_is_error() {
        let err = ExperimentConfig::from_json_over(&ExperimentConfig::default(), "[1, 2")
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_partial_config_json() {
        let config: ExperimentConfig =
            serde_json::from_str(r#"{"num_blocks": 5, "seed": 11}"#).unwrap();
        assert_eq!(config.num_blocks, 5);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.z_threshold, 1.5);
    }
}
