//! Synthetic transaction generation.
//!
//! Everything draws from a caller-supplied `StdRng`, so a seeded run is
//! fully reproducible.

use blockwatch::Transaction;
use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::ops::Range;

pub const SENDERS: [&str; 4] = ["Alice", "Bob", "Charlie", "Dave"];
pub const RECEIVERS: [&str; 4] = ["Eve", "Frank", "Grace", "Heidi"];

/// Lower bound for generated block intervals (seconds).
pub const MIN_INTERVAL_SECS: f64 = 0.0001;

/// Amount ranges used by the built-in scenarios.
pub const NORMAL_AMOUNT: Range<f64> = 1.0..100.0;
pub const SUSPICIOUS_AMOUNT: Range<f64> = 1000.0..5000.0;

pub fn random_transaction(rng: &mut StdRng, amount: Range<f64>) -> Transaction {
    let sender = SENDERS[rng.random_range(0..SENDERS.len())];
    let receiver = RECEIVERS[rng.random_range(0..RECEIVERS.len())];
    Transaction::new(sender, receiver, rng.random_range(amount))
}

pub fn random_transactions(rng: &mut StdRng, count: usize, amount: Range<f64>) -> Vec<Transaction> {
    (0..count)
        .map(|_| random_transaction(rng, amount.clone()))
        .collect()
}

/// Inter-block interval around `mean_secs` with gaussian jitter.
/// Never returns less than [`MIN_INTERVAL_SECS`].
pub fn jittered_interval(rng: &mut StdRng, mean_secs: f64, jitter_secs: f64) -> f64 {
    let interval = match Normal::new(mean_secs, jitter_secs) {
        Ok(dist) => dist.sample(rng),
        Err(_) => mean_secs,
    };
    interval.max(MIN_INTERVAL_SECS)
}
