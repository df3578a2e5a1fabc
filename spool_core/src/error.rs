//! Error types of the monitor engine.

use thiserror::Error;

/// Typed failures of one monitor cycle or of engine setup.
///
/// Cycle-level errors never abort the loop; they surface as report diagnostics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MonitorError {
    /// Backend error without a more specific mapping.
    #[error("hardware error: {0}")]
    Hardware(String),
    /// Typed `HwError` other than a timeout.
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    /// Invalid sample count, unknown selector position or missing profile.
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for sensor")]
    Timeout,
    /// No zero offset: neither configured nor captured by set-zero.
    #[error("scale is not calibrated")]
    Uncalibrated,
}

/// Rejections from [`crate::MonitorBuilder`] and [`crate::build_monitor`].
#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing scale")]
    MissingScale,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
