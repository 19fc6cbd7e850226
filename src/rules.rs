//! Fixed-threshold security rules.
//!
//! Stateless: every block is judged on its own features, independently of
//! the statistical detector. All rules are evaluated; none short-circuit.

use crate::config::RuleConfig;
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// A single transaction is too large.
    MaxSingleTx,
    /// The block moves too much value in total.
    MaxBlockTotal,
    /// The block followed its predecessor too quickly.
    MinTimeDelta,
}

impl Rule {
    pub fn id(self) -> &'static str {
        match self {
            Rule::MaxSingleTx => "Rule1",
            Rule::MaxBlockTotal => "Rule2",
            Rule::MinTimeDelta => "Rule3",
        }
    }
}

/// One breached rule with the values that were compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: Rule,
    pub measured: f64,
    pub threshold: f64,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rule {
            Rule::MaxSingleTx => write!(
                f,
                "{}: max_amount {:.2} > {:.2}",
                self.rule.id(),
                self.measured,
                self.threshold
            ),
            Rule::MaxBlockTotal => write!(
                f,
                "{}: total_amount {:.2} > {:.2}",
                self.rule.id(),
                self.measured,
                self.threshold
            ),
            Rule::MinTimeDelta => write!(
                f,
                "{}: time_delta {:.3} < {:.3}",
                self.rule.id(),
                self.measured,
                self.threshold
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleDecision {
    pub rule_alert: bool,
    /// In rule order.
    pub violations: Vec<RuleViolation>,
}

impl RuleDecision {
    pub fn descriptions(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }

    pub fn violated(&self, rule: Rule) -> Option<&RuleViolation> {
        self.violations.iter().find(|v| v.rule == rule)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleChecker {
    max_single_tx_amount: f64,
    max_block_total_amount: f64,
    min_time_delta: f64,
}

impl RuleChecker {
    pub fn new(
        max_single_tx_amount: f64,
        max_block_total_amount: f64,
        min_time_delta: f64,
    ) -> Self {
        Self {
            max_single_tx_amount,
            max_block_total_amount,
            min_time_delta,
        }
    }

    pub fn from_config(config: &RuleConfig) -> Self {
        Self::new(
            config.max_single_tx_amount,
            config.max_block_total_amount,
            config.min_time_delta,
        )
    }

    pub fn check(&self, features: &FeatureVector) -> RuleDecision {
        let mut violations = Vec::new();

        if features.max_amount > self.max_single_tx_amount {
            violations.push(RuleViolation {
                rule: Rule::MaxSingleTx,
                measured: features.max_amount,
                threshold: self.max_single_tx_amount,
            });
        }

        if features.total_amount > self.max_block_total_amount {
            violations.push(RuleViolation {
                rule: Rule::MaxBlockTotal,
                measured: features.total_amount,
                threshold: self.max_block_total_amount,
            });
        }

        // A zero delta is the "no predecessor" sentinel and is never rate-limited.
        if features.time_delta != 0.0 && features.time_delta < self.min_time_delta {
            violations.push(RuleViolation {
                rule: Rule::MinTimeDelta,
                measured: features.time_delta,
                threshold: self.min_time_delta,
            });
        }

        RuleDecision {
            rule_alert: !violations.is_empty(),
            violations,
        }
    }

    pub fn max_single_tx_amount(&self) -> f64 {
        self.max_single_tx_amount
    }

    pub fn max_block_total_amount(&self) -> f64 {
        self.max_block_total_amount
    }

    pub fn min_time_delta(&self) -> f64 {
        self.min_time_delta
    }
}

impl Default for RuleChecker {
    fn default() -> Self {
        Self::from_config(&RuleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(total: f64, max: f64, dt: f64) -> FeatureVector {
        FeatureVector {
            num_txs: 1.0,
            total_amount: total,
            max_amount: max,
            time_delta: dt,
        }
    }

    #[test]
    fn test_clean_block() {
        let d = RuleChecker::default().check(&fv(300.0, 90.0, 0.1));
        assert!(!d.rule_alert);
        assert!(d.violations.is_empty());
    }

    #[test]
    fn test_single_tx_rule() {
        let d = RuleChecker::default().check(&fv(2500.0, 2500.0, 0.1));
        let v = d.violated(Rule::MaxSingleTx).unwrap();
        assert_eq!(v.measured, 2500.0);
        assert_eq!(v.threshold, 2000.0);
        assert_eq!(v.to_string(), "Rule1: max_amount 2500.00 > 2000.00");
        assert!(d.rule_alert);
    }

    #[test]
    fn test_block_total_rule() {
        let d = RuleChecker::default().check(&fv(6000.0, 1500.0, 0.1));
        let v = d.violated(Rule::MaxBlockTotal).unwrap();
        assert_eq!(v.measured, 6000.0);
        assert_eq!(v.threshold, 5000.0);
        assert_eq!(d.violations.len(), 1);
        assert_eq!(d.descriptions(), vec!["Rule2: total_amount 6000.00 > 5000.00"]);
    }

    #[test]
    fn test_time_delta_rule() {
        let d = RuleChecker::default().check(&fv(10.0, 10.0, 0.01));
        let v = d.violated(Rule::MinTimeDelta).unwrap();
        assert_eq!(v.measured, 0.01);
        assert_eq!(v.threshold, 0.02);
        assert_eq!(v.to_string(), "Rule3: time_delta 0.010 < 0.020");
    }

    #[test]
    fn test_zero_time_delta_exempt() {
        let d = RuleChecker::default().check(&fv(10.0, 10.0, 0.0));
        assert!(d.violated(Rule::MinTimeDelta).is_none());
        assert!(!d.rule_alert);

        let strict = RuleChecker::new(2000.0, 5000.0, 1_000.0);
        assert!(!strict.check(&fv(10.0, 10.0, 0.0)).rule_alert);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let d = RuleChecker::default().check(&fv(5000.0, 2000.0, 0.02));
        assert!(!d.rule_alert);
    }

    #[test]
    fn test_all_rules_collected_in_order() {
        let d = RuleChecker::default().check(&fv(9000.0, 4000.0, 0.005));
        let rules: Vec<Rule> = d.violations.iter().map(|v| v.rule).collect();
        assert_eq!(
            rules,
            vec![Rule::MaxSingleTx, Rule::MaxBlockTotal, Rule::MinTimeDelta]
        );
        assert!(d.rule_alert);
    }

    #[test]
    fn test_from_config() {
        let config = RuleConfig {
            max_single_tx_amount: 1.0,
            max_block_total_amount: 2.0,
            min_time_delta: 3.0,
        };
        let checker = RuleChecker::from_config(&config);
        assert_eq!(checker.max_single_tx_amount(), 1.0);
        assert_eq!(checker.max_block_total_amount(), 2.0);
        assert_eq!(checker.min_time_delta(), 3.0);
    }
}
