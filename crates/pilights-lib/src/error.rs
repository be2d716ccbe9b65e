//! Unified error type for the pilights-lib crate.
//!
//! [`PilightsError`] wraps [`GpioError`] and I/O failures plus configuration
//! problems. `From` impls let `?` cross module boundaries.

use std::fmt;

use crate::gpio::GpioError;

#[derive(Debug)]
pub enum PilightsError {
    /// GPIO driver fault, passed through unchanged.
    Gpio(GpioError),
    /// Standard I/O error (config file read/write).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
}

impl fmt::Display for PilightsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PilightsError::Gpio(e) => write!(f, "{e}"),
            PilightsError::Io(e) => write!(f, "I/O error: {e}"),
            PilightsError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for PilightsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PilightsError::Gpio(e) => Some(e),
            PilightsError::Io(e) => Some(e),
            PilightsError::Config(_) => None,
        }
    }
}

impl From<GpioError> for PilightsError {
    fn from(e: GpioError) -> Self {
        PilightsError::Gpio(e)
    }
}

impl From<std::io::Error> for PilightsError {
    fn from(e: std::io::Error) -> Self {
        PilightsError::Io(e)
    }
}

/// Crate-level Result alias using [`PilightsError`].
pub type Result<T> = std::result::Result<T, PilightsError>;
