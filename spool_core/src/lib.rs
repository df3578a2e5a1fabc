#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core filament-spool monitor logic (hardware-agnostic).
//!
//! All hardware goes through the `spool_traits` capabilities: `Scale`,
//! `SelectorInput`, `ControlInput` and `Indicator`.
//!
//! ## Pipeline
//!
//! - **Acquirer**: burst of raw reads reduced by mean (`acquirer`)
//! - **Calibration**: zero offset and roll tare (`calibration`)
//! - **Tension filter**: noise / real / artifact bands, hold-last-good (`tension`)
//! - **Estimator**: grams to cm and m for the selected profile (`estimator`)
//! - **Status**: NONE / READY / PRINTING / LOAD (`status`)
//!
//! `MonitorCore` runs the pipeline once per cycle and returns a `Report`;
//! `runner::run` paces it and ships reports over a bounded channel.

pub mod acquirer;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod estimator;
pub mod hw_error;
pub mod mocks;
pub mod monitor;
pub mod profile;
pub mod report;
pub mod runner;
pub mod status;
pub mod tension;

pub use acquirer::{Acquirer, reduce};
pub use calibration::{CalibrationState, CalibrationUnit};
pub use config::{AcquireCfg, CalibrationCfg, FilterCfg, MonitorParams, StatusCfg};
pub use error::{BuildError, MonitorError, Result};
pub use estimator::{Estimate, FilamentQuantity, estimate};
pub use monitor::{
    Cycle, Missing, Monitor, MonitorBuilder, MonitorCore, MonitorG, Set, build_monitor,
};
pub use profile::{
    Diameter, Material, MaterialProfile, MaterialTable, RollClass, RollTare, Selection, TareTable,
};
pub use report::{Diagnostic, Report};
pub use status::{RollStatus, RollStatusMachine, StatusEvent};
pub use tension::{Band, FilterOutcome, StableReading, TensionFilter, classify};
