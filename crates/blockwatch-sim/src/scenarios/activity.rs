use crate::generator::{self, NORMAL_AMOUNT, SUSPICIOUS_AMOUNT};
use crate::scenarios::BlockScenario;
use rand::Rng;
use rand::rngs::StdRng;
use std::ops::{Range, RangeInclusive};

// --- 1. Normal Activity ---
pub struct NormalActivity {
    pub tx_count: RangeInclusive<usize>,
    pub amount: Range<f64>,
    pub interval_secs: f64,
    pub jitter_secs: f64,
}

impl Default for NormalActivity {
    fn default() -> Self {
        Self {
            tx_count: 1..=5,
            amount: NORMAL_AMOUNT,
            interval_secs: 0.1,
            jitter_secs: 0.002,
        }
    }
}

impl BlockScenario for NormalActivity {
    fn name(&self) -> &str {
        "normal"
    }

    fn is_anomalous(&self) -> bool {
        false
    }

    fn transaction_count(&mut self, rng: &mut StdRng) -> usize {
        rng.random_range(self.tx_count.clone())
    }

    fn amount(&self) -> Range<f64> {
        self.amount.clone()
    }

    fn interval(&mut self, rng: &mut StdRng) -> f64 {
        generator::jittered_interval(rng, self.interval_secs, self.jitter_secs)
    }
}

// --- 2. Suspicious Activity (large, rapid blocks) ---
pub struct SuspiciousActivity {
    pub tx_count: RangeInclusive<usize>,
    pub amount: Range<f64>,
    pub interval_secs: f64,
    pub jitter_secs: f64,
}

impl Default for SuspiciousActivity {
    fn default() -> Self {
        Self {
            tx_count: 6..=10,
            amount: SUSPICIOUS_AMOUNT,
            interval_secs: 0.01,
            jitter_secs: 0.001,
        }
    }
}

impl BlockScenario for SuspiciousActivity {
    fn name(&self) -> &str {
        "suspicious"
    }

    fn is_anomalous(&self) -> bool {
        true
    }

    fn transaction_count(&mut self, rng: &mut StdRng) -> usize {
        rng.random_range(self.tx_count.clone())
    }

    fn amount(&self) -> Range<f64> {
        self.amount.clone()
    }

    fn interval(&mut self, rng: &mut StdRng) -> f64 {
        generator::jittered_interval(rng, self.interval_secs, self.jitter_secs)
    }
}
