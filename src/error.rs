use thiserror::Error;

/// Errors raised at the edges of the crate: configuration loading and
/// ledger integrity checks. Detection itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("Block {index} hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("Broken chain link between blocks {previous} and {current}")]
    BrokenLink { previous: u64, current: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
