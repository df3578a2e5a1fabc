//! Per-cycle report handed to the display/host consumer.

use core::fmt;

use crate::error::MonitorError;
use crate::estimator::FilamentQuantity;
use crate::profile::Selection;
use crate::status::RollStatus;
use crate::tension::StableReading;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Net weight was negative; quantity clamped to zero.
    BelowZeroReading { net_g: f32 },
    /// No zero offset; quantity suppressed.
    UncalibratedState,
    /// Invalid selector or profile; quantity suppressed until corrected.
    Config(String),
    /// Acquisition failed; the last good reading is held.
    Acquisition(MonitorError),
    /// Tension artifact held back.
    ArtifactHeld { delta_g: f32, streak: u32 },
    /// Set-zero pressed on a cycle without a reading.
    SetZeroIgnored,
}

impl Diagnostic {
    /// Stable machine-readable tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BelowZeroReading { .. } => "below_zero",
            Self::UncalibratedState => "uncalibrated",
            Self::Config(_) => "config",
            Self::Acquisition(_) => "acquisition",
            Self::ArtifactHeld { .. } => "artifact_held",
            Self::SetZeroIgnored => "set_zero_ignored",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelowZeroReading { net_g } => write!(f, "net weight {net_g:.2} g below zero"),
            Self::UncalibratedState => f.write_str("scale not calibrated; press set-zero"),
            Self::Config(msg) => write!(f, "configuration: {msg}"),
            Self::Acquisition(e) => write!(f, "acquisition: {e}"),
            Self::ArtifactHeld { delta_g, streak } => {
                write!(f, "tension artifact {delta_g:+.1} g held ({streak} in a row)")
            }
            Self::SetZeroIgnored => f.write_str("set-zero ignored: no reading this cycle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub cycle: u64,
    pub status: RollStatus,
    pub selection: Option<Selection>,
    pub reading: Option<StableReading>,
    pub quantity: Option<FilamentQuantity>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Quantity figures may be shown.
    pub fn valid(&self) -> bool {
        self.quantity.is_some()
    }

    pub fn has(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code() == code)
    }
}
