//! Common error types for AirSync

use thiserror::Error;

/// Common result type for AirSync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the sync core
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (unparsable instant, out-of-range calendar arithmetic)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Civil timezone could not be resolved from the tz database
    #[error("Timezone error: {0}")]
    Timezone(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
