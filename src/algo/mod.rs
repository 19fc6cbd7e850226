pub mod baseline;
pub mod stats;

// Re-exports for convenience
pub use baseline::{BaselineEstimator, BaselinePhase, BaselineStats, HistoryStore, Observation};
pub use stats::{FeatureStats, mean, sample_std};
