//! One-shot streaming baseline.
//!
//! Feature values are appended to an unbounded history. The first time the
//! history reaches `baseline_size` samples, per-feature mean and sample
//! standard deviation are computed and frozen for the life of the estimator.
//! There is no sliding window and no decay.

use crate::algo::stats::FeatureStats;
use crate::features::{Feature, FeatureVector};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Append-only per-feature history.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    series: [Vec<f64>; 4],
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, features: &FeatureVector) {
        for (series, value) in self.series.iter_mut().zip(features.to_array()) {
            series.push(value);
        }
    }

    /// Number of samples; identical for every feature.
    pub fn len(&self) -> usize {
        self.series[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn series(&self, feature: Feature) -> &[f64] {
        &self.series[feature.index()]
    }
}

/// Frozen per-feature statistics.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BaselineStats {
    stats: [FeatureStats; 4],
}

impl BaselineStats {
    pub fn from_history(history: &HistoryStore) -> Self {
        Self {
            stats: Feature::ALL.map(|f| FeatureStats::from_samples(history.series(f))),
        }
    }

    pub fn get(&self, feature: Feature) -> FeatureStats {
        self.stats[feature.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, FeatureStats)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }
}

/// Lifecycle of the baseline. Transitions only move forward:
/// `Collecting -> Computed -> Scoring`, and `Scoring` is terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BaselinePhase {
    /// Fewer than `baseline_size` samples seen.
    Collecting,
    /// Baseline frozen on the most recent observation.
    Computed(BaselineStats),
    /// Every observation after the one that froze the baseline.
    Scoring(BaselineStats),
}

impl BaselinePhase {
    pub fn stats(&self) -> Option<&BaselineStats> {
        match self {
            BaselinePhase::Collecting => None,
            BaselinePhase::Computed(stats) | BaselinePhase::Scoring(stats) => Some(stats),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.stats().is_some()
    }
}

/// What a single observation produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Observation {
    Collecting { collected: usize, required: usize },
    BaselineComputed(BaselineStats),
    Ready(BaselineStats),
}

#[derive(Debug, Clone)]
pub struct BaselineEstimator {
    baseline_size: usize,
    history: HistoryStore,
    phase: BaselinePhase,
}

impl BaselineEstimator {
    /// `baseline_size` below 1 is treated as 1.
    pub fn new(baseline_size: usize) -> Self {
        Self {
            baseline_size: baseline_size.max(1),
            history: HistoryStore::new(),
            phase: BaselinePhase::Collecting,
        }
    }

    /// Record `features` and advance the phase.
    pub fn observe(&mut self, features: &FeatureVector) -> Observation {
        self.history.push(features);

        match self.phase {
            BaselinePhase::Collecting => {
                let collected = self.history.len();
                if collected < self.baseline_size {
                    return Observation::Collecting {
                        collected,
                        required: self.baseline_size,
                    };
                }
                let stats = BaselineStats::from_history(&self.history);
                info!(samples = collected, "baseline frozen");
                self.phase = BaselinePhase::Computed(stats);
                Observation::BaselineComputed(stats)
            }
            BaselinePhase::Computed(stats) | BaselinePhase::Scoring(stats) => {
                self.phase = BaselinePhase::Scoring(stats);
                Observation::Ready(stats)
            }
        }
    }

    pub fn phase(&self) -> &BaselinePhase {
        &self.phase
    }

    pub fn baseline(&self) -> Option<&BaselineStats> {
        self.phase.stats()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn baseline_size(&self) -> usize {
        self.baseline_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fv(num_txs: f64, total: f64, max: f64, dt: f64) -> FeatureVector {
        FeatureVector {
            num_txs,
            total_amount: total,
            max_amount: max,
            time_delta: dt,
        }
    }

    #[test]
    fn test_history_grows_unconditionally() {
        let mut est = BaselineEstimator::new(3);
        for n in 1..=10 {
            est.observe(&fv(1.0, 2.0, 3.0, 4.0));
            assert_eq!(est.history().len(), n);
            for feature in Feature::ALL {
                assert_eq!(est.history().series(feature).len(), n);
            }
        }
    }

    #[test]
    fn test_phase_transitions_once() {
        let mut est = BaselineEstimator::new(3);

        assert!(matches!(
            est.observe(&fv(1.0, 1.0, 1.0, 0.0)),
            Observation::Collecting { collected: 1, required: 3 }
        ));
        assert_eq!(*est.phase(), BaselinePhase::Collecting);
        assert!(est.baseline().is_none());

        est.observe(&fv(2.0, 2.0, 2.0, 1.0));
        assert!(est.baseline().is_none());

        let third = est.observe(&fv(3.0, 3.0, 3.0, 1.0));
        let frozen = match third {
            Observation::BaselineComputed(stats) => stats,
            other => panic!("expected baseline on third sample, got {:?}", other),
        };
        assert!(matches!(est.phase(), BaselinePhase::Computed(_)));

        for _ in 0..5 {
            assert_eq!(est.observe(&fv(100.0, 100.0, 100.0, 9.0)), Observation::Ready(frozen));
            assert_eq!(*est.phase(), BaselinePhase::Scoring(frozen));
        }
    }

    #[test]
    fn test_baseline_not_recomputed() {
        let mut est = BaselineEstimator::new(2);
        est.observe(&fv(1.0, 10.0, 5.0, 0.0));
        est.observe(&fv(3.0, 10.0, 5.0, 2.0));
        let frozen = *est.baseline().unwrap();
        assert_eq!(frozen.get(Feature::NumTxs).mean, 2.0);

        for _ in 0..20 {
            est.observe(&fv(50.0, 500.0, 250.0, 0.5));
        }
        assert_eq!(*est.baseline().unwrap(), frozen);
    }

    #[test]
    fn test_baseline_size_one() {
        let mut est = BaselineEstimator::new(1);
        match est.observe(&fv(4.0, 8.0, 2.0, 0.0)) {
            Observation::BaselineComputed(stats) => {
                for (_, s) in stats.iter() {
                    assert_eq!(s.std, 0.0);
                }
                assert_eq!(stats.get(Feature::TotalAmount).mean, 8.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zero_baseline_size_clamped() {
        let est = BaselineEstimator::new(0);
        assert_eq!(est.baseline_size(), 1);
    }
}
