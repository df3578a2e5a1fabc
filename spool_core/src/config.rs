//! Runtime configuration for the monitor engine.
//!
//! These are the structs the engine consumes. They are separate from the TOML
//! schema in `spool_config`; see `conversions` for the mapping.

use crate::profile::{MaterialTable, TareTable};

/// Sample acquisition burst.
#[derive(Debug, Clone)]
pub struct AcquireCfg {
    /// Raw reads averaged per cycle. Must be >= 1.
    pub samples: i32,
    /// Max sensor wait per read (ms).
    pub read_timeout_ms: u64,
}

impl Default for AcquireCfg {
    fn default() -> Self {
        Self {
            samples: 10,
            read_timeout_ms: 150,
        }
    }
}

/// Tension filter bands.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Deltas below this are noise (g).
    pub resolution_g: f32,
    /// Deltas at or above this are extruder pull (g).
    pub tension_threshold_g: f32,
    /// Accept an artifact-band reading once this many artifacts were held in a row.
    pub artifact_accept_after: Option<u32>,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            resolution_g: 0.15,
            tension_threshold_g: 50.0,
            artifact_accept_after: Some(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusCfg {
    /// Consecutive cycles without an accepted decrease before PRINTING returns to READY.
    pub idle_cycles: u32,
}

impl Default for StatusCfg {
    fn default() -> Self {
        Self { idle_cycles: 10 }
    }
}

#[derive(Debug, Clone)]
pub struct CalibrationCfg {
    /// Zero offset restored on startup and restart; `None` waits for set-zero.
    pub zero_offset_raw: Option<f32>,
    pub tare: TareTable,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            // Empty-mount reading of the reference printed holder.
            zero_offset_raw: Some(428.0),
            tare: TareTable::default(),
        }
    }
}

/// Everything needed to assemble a monitor besides its hardware.
#[derive(Debug, Clone, Default)]
pub struct MonitorParams {
    pub acquire: AcquireCfg,
    pub filter: FilterCfg,
    pub status: StatusCfg,
    pub calibration: CalibrationCfg,
    pub materials: MaterialTable,
}
