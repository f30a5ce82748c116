// src/error.rs
// Error type for everything that can fail before the first round starts.
// Negative outcomes inside a round are attempt records, not errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("distribution error: {0}")]
    Distribution(#[from] rand_distr::NormalError),
}

pub type SimResult<T> = Result<T, SimError>;
