//! Error types for interval-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimeZone(String),

    #[error("Interval not valid: {0}")]
    InvalidInterval(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, IntervalError>;
