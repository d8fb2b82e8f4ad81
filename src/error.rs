//! Error types for SWATS

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Optimizer does not expose {0}")]
    MissingOptimizerState(&'static str),

    #[error("No best-weights snapshot to restore")]
    NoWeightsSnapshot,

    #[error("Re-training procedure failed: {0}")]
    Retrain(String),
}

pub type Result<T> = std::result::Result<T, Error>;
