//! Maps `Box<dyn Error>` from trait boundaries to typed `MonitorError`.
//!
//! The traits in `spool_traits` use `Box<dyn Error + Send + Sync>` so any backend can
//! plug in; this module converts those to our typed error enum, with an optional
//! feature-gated path for `spool_hardware::HwError` downcasting.

use crate::error::MonitorError;

/// Map a trait-boundary error to a typed `MonitorError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> MonitorError {
    #[cfg(feature = "hardware-errors")]
    {
        use spool_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Timeout | HwError::DataReadyTimeout => MonitorError::Timeout,
                other => MonitorError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        MonitorError::Timeout
    } else {
        MonitorError::Hardware(s)
    }
}
