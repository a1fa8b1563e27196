//! Error types for DiDLab

use thiserror::Error;

/// DiDLab error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Simulator parameters rejected before any draw is made
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Degenerate design: empty treat×post cell, singular X'X, unit leverage
    #[error("Estimation error: {0}")]
    Estimation(String),

    /// Malformed input data (panel rows, array lengths)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Runtime failure outside the statistics (e.g. thread pool setup)
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
