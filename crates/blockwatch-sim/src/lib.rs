//! # blockwatch-sim - Synthetic Ledger Experiments
//!
//! Generates a toy blockchain where each block is either normal or
//! suspicious (ground truth), runs every block through a
//! [`blockwatch::BlockMonitor`], and scores both detection strategies
//! against the labels.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      Experiment                           │
//! │  ┌─────────────┐   ┌──────────────┐   ┌────────────────┐  │
//! │  │  Scenarios  │──►│  Blockchain  │──►│  BlockMonitor  │  │
//! │  │  (seeded)   │   │ (logical t)  │   │ (z-score+rules)│  │
//! │  └─────────────┘   └──────────────┘   └────────────────┘  │
//! │                                               │           │
//! │                                               ▼           │
//! │                          BlockRecord ──► ExperimentSummary│
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use blockwatch_sim::{Experiment, ExperimentConfig};
//!
//! let config = ExperimentConfig {
//!     num_blocks: 20,
//!     seed: Some(42),
//!     ..ExperimentConfig::default()
//! };
//! let report = Experiment::new(config).unwrap().run();
//! assert_eq!(report.records.len(), 20);
//! assert!(report.chain_valid);
//! ```

pub mod core;
pub mod engine;
pub mod generator;
pub mod scenarios;

pub use crate::core::{BlockRecord, DetectorMetrics, ExperimentSummary, calculate_metrics};
pub use engine::{Experiment, ExperimentConfig, ExperimentReport};
pub use scenarios::{BlockScenario, create_scenario, list_scenarios};
