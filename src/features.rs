//! Block feature extraction.

use crate::ledger::Block;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the four per-block signals, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    NumTxs,
    TotalAmount,
    MaxAmount,
    TimeDelta,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::NumTxs,
        Feature::TotalAmount,
        Feature::MaxAmount,
        Feature::TimeDelta,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::NumTxs => "num_txs",
            Feature::TotalAmount => "total_amount",
            Feature::MaxAmount => "max_amount",
            Feature::TimeDelta => "time_delta",
        }
    }

    /// Position in [`Feature::ALL`], used to index per-feature arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric signals derived from one block and its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub num_txs: f64,
    pub total_amount: f64,
    pub max_amount: f64,
    /// Seconds since the previous block; 0.0 when there is none.
    pub time_delta: f64,
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::NumTxs => self.num_txs,
            Feature::TotalAmount => self.total_amount,
            Feature::MaxAmount => self.max_amount,
            Feature::TimeDelta => self.time_delta,
        }
    }

    /// Values in [`Feature::ALL`] order.
    pub fn to_array(&self) -> [f64; 4] {
        [
            self.num_txs,
            self.total_amount,
            self.max_amount,
            self.time_delta,
        ]
    }
}

/// Compute the feature vector for `current`.
///
/// Empty blocks yield 0.0 for both amount features; a missing predecessor
/// yields a 0.0 time delta.
pub fn extract(current: &Block, previous: Option<&Block>) -> FeatureVector {
    let txs = current.transactions();

    let total_amount = txs.iter().map(|t| t.amount).sum::<f64>();
    let max_amount = txs.iter().map(|t| t.amount).fold(0.0_f64, f64::max);
    let time_delta = previous
        .map(|prev| current.timestamp() - prev.timestamp())
        .unwrap_or(0.0);

    FeatureVector {
        num_txs: txs.len() as f64,
        total_amount,
        max_amount,
        time_delta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Transaction;

    #[test]
    fn test_empty_block_defaults() {
        let block = Block::new(3, 50.0, Vec::new(), "x");
        let features = extract(&block, None);
        assert_eq!(features.num_txs, 0.0);
        assert_eq!(features.total_amount, 0.0);
        assert_eq!(features.max_amount, 0.0);
        assert_eq!(features.time_delta, 0.0);
    }

    #[test]
    fn test_amount_features() {
        let block = Block::new(
            1,
            10.0,
            vec![
                Transaction::new("Alice", "Eve", 25.0),
                Transaction::new("Bob", "Frank", 70.5),
                Transaction::new("Dave", "Heidi", 4.5),
            ],
            "x",
        );
        let features = extract(&block, None);
        assert_eq!(features.num_txs, 3.0);
        assert_eq!(features.total_amount, 100.0);
        assert_eq!(features.max_amount, 70.5);
    }

    #[test]
    fn test_time_delta_uses_previous_block() {
        let prev = Block::new(1, 10.0, Vec::new(), "a");
        let cur = Block::new(2, 10.25, Vec::new(), prev.hash());
        assert!((extract(&cur, Some(&prev)).time_delta - 0.25).abs() < 1e-12);
        assert_eq!(extract(&cur, None).time_delta, 0.0);
    }

    #[test]
    fn test_accessors_follow_canonical_order() {
        let features = FeatureVector {
            num_txs: 1.0,
            total_amount: 2.0,
            max_amount: 3.0,
            time_delta: 4.0,
        };
        for feature in Feature::ALL {
            assert_eq!(features.get(feature), features.to_array()[feature.index()]);
        }
        assert_eq!(Feature::TimeDelta.to_string(), "time_delta");
    }

    #[test]
    fn test_feature_serializes_as_name() {
        let json = serde_json::to_string(&Feature::MaxAmount).unwrap();
        assert_eq!(json, "\"max_amount\"");
    }
}
