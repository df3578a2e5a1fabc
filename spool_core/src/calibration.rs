//! Zero offset and roll tare.
//!
//! net = raw - zero_offset_raw - tare_g
//!
//! Re-zeroing is operator-triggered only; automatic drift correction with filament
//! loaded would fold real mass into the offset.

use crate::config::CalibrationCfg;
use crate::error::MonitorError;
use crate::profile::{RollClass, RollTare, TareTable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState {
    pub zero_offset_raw: f32,
}

#[derive(Debug, Clone)]
pub struct CalibrationUnit {
    default_zero: Option<f32>,
    state: Option<CalibrationState>,
    tares: TareTable,
    tare: RollTare,
}

impl CalibrationUnit {
    pub fn new(cfg: &CalibrationCfg) -> Self {
        Self {
            default_zero: cfg.zero_offset_raw,
            state: cfg
                .zero_offset_raw
                .map(|zero_offset_raw| CalibrationState { zero_offset_raw }),
            tares: cfg.tare,
            tare: cfg.tare.tare(RollClass::Kg1),
        }
    }

    /// Capture `raw` (the current averaged reading of the empty mount) as zero.
    pub fn set_zero(&mut self, raw: f32) -> Result<(), MonitorError> {
        if !raw.is_finite() {
            return Err(MonitorError::Hardware("cannot zero on a non-finite reading".into()));
        }
        tracing::info!(
            previous = self.state.map(|s| s.zero_offset_raw),
            zero_offset_raw = raw,
            "scale zeroed"
        );
        self.state = Some(CalibrationState {
            zero_offset_raw: raw,
        });
        Ok(())
    }

    /// Select the tare baseline. Returns true when the class changed.
    pub fn select_roll_tare(&mut self, class: RollClass) -> bool {
        if self.tare.class == class {
            return false;
        }
        self.tare = self.tares.tare(class);
        tracing::info!(roll = %class, tare_g = self.tare.tare_g, "roll tare selected");
        true
    }

    /// Back to the configured zero offset; the tare selection is kept.
    pub fn restart(&mut self) {
        self.state = self
            .default_zero
            .map(|zero_offset_raw| CalibrationState { zero_offset_raw });
        tracing::info!(zero_offset_raw = self.default_zero, "calibration restarted");
    }

    pub fn is_calibrated(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<CalibrationState> {
        self.state
    }

    pub fn tare(&self) -> RollTare {
        self.tare
    }

    /// Net filament mass for a raw reading. Not clamped.
    pub fn net_weight(&self, raw: f32) -> Result<f32, MonitorError> {
        let state = self.state.ok_or(MonitorError::Uncalibrated)?;
        Ok(raw - state.zero_offset_raw - self.tare.tare_g)
    }
}
