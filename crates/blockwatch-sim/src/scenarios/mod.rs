//! Block Scenarios
//!
//! A scenario decides what one block looks like: how many transactions, how
//! large, and how long after its predecessor it is sealed.
//! - **normal**: a handful of small transfers at a steady pace
//! - **suspicious**: many large transfers in rapid succession

pub mod activity;

use crate::generator;
use blockwatch::Transaction;
use rand::rngs::StdRng;
use std::ops::Range;

/// Trait for block scenarios
pub trait BlockScenario: Send {
    /// Human-readable name of the scenario
    fn name(&self) -> &str;

    /// Ground-truth label attached to blocks produced by this scenario
    fn is_anomalous(&self) -> bool;

    /// Number of transactions in the next block
    fn transaction_count(&mut self, rng: &mut StdRng) -> usize;

    /// Range each transaction amount is drawn from
    fn amount(&self) -> Range<f64>;

    /// Seconds between the previous block and the next one
    fn interval(&mut self, rng: &mut StdRng) -> f64;

    /// Transactions for the next block
    fn transactions(&mut self, rng: &mut StdRng) -> Vec<Transaction> {
        let count = self.transaction_count(rng);
        generator::random_transactions(rng, count, self.amount())
    }
}

pub use activity::{NormalActivity, SuspiciousActivity};

/// Create a scenario by name with default parameters
pub fn create_scenario(name: &str) -> Option<Box<dyn BlockScenario>> {
    match name.to_lowercase().as_str() {
        "normal" | "normal_activity" => Some(Box::new(NormalActivity::default())),
        "suspicious" | "suspicious_activity" | "burst" => {
            Some(Box::new(SuspiciousActivity::default()))
        }
        _ => None,
    }
}

/// List all available scenarios
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("normal", "1-5 transfers of 1-100 units, ~0.1s apart"),
        (
            "suspicious",
            "6-10 transfers of 1000-5000 units, ~0.01s apart",
        ),
    ]
}
