//! Error types for the matching engine

use thiserror::Error;

/// Result type for matching operations
pub type Result<T> = std::result::Result<T, Error>;

/// Matching errors
///
/// The matching functions themselves never fail; these cover record
/// validation and configuration loading.
#[derive(Error, Debug)]
pub enum Error {
    /// Request violates record invariants
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
