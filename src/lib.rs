//! # blockwatch - anomaly detection over an append-only block ledger
//!
//! Every appended block is reduced to four features and judged by two
//! independent strategies:
//!
//! ```text
//! ┌──────────┐   Block    ┌──────────────┐  FeatureVector  ┌──────────────────┐
//! │  Ledger  │──────────▶ │   features   │───────┬───────▶ │  ZScoreDetector  │──▶ Decision
//! │ (ledger) │ (+ prev)   │  ::extract   │       │         │ (one-shot base-  │
//! └──────────┘            └──────────────┘       │         │  line, frozen)   │
//!                                                │         └──────────────────┘
//!                                                │         ┌──────────────────┐
//!                                                └───────▶ │   RuleChecker    │──▶ RuleDecision
//!                                                          │   (stateless)    │
//!                                                          └──────────────────┘
//! ```
//!
//! The statistical detector collects `baseline_size` samples, freezes a
//! per-feature mean / sample standard deviation once, and scores every later
//! block with a z-score. The rule checker applies three fixed thresholds.
//! [`BlockMonitor`] wires both together for a single ledger.
//!
//! ## Quick Start
//!
//! ```rust
//! use blockwatch::{BlockMonitor, Blockchain, MonitorConfig, Transaction};
//!
//! let mut chain = Blockchain::starting_at(0.0);
//! let mut monitor = BlockMonitor::new(&MonitorConfig::default());
//!
//! chain.add_block_at(vec![Transaction::new("Alice", "Eve", 42.0)], 0.1);
//! let blocks = chain.blocks();
//! let report = monitor.observe(&blocks[1], Some(&blocks[0]));
//! assert!(!report.decision.is_anomaly);
//! ```

pub mod algo;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod features;
pub mod ledger;
pub mod rules;

pub use algo::{BaselinePhase, BaselineStats, FeatureStats};
pub use config::{DetectorConfig, MonitorConfig, RuleConfig};
pub use detector::{Decision, DecisionReason, ZScoreDetector};
pub use engine::{BlockMonitor, BlockReport};
pub use error::{Error, Result};
pub use features::{Feature, FeatureVector, extract};
pub use ledger::{Block, Blockchain, Transaction};
pub use rules::{Rule, RuleChecker, RuleDecision, RuleViolation};
