//! The monitor core: one acquire, calibrate, filter, estimate, transition pass per cycle.

use std::marker::PhantomData;
use std::time::Duration;

use spool_traits::{
    ControlInput, ControlSignal, Indicator, NoIndicator, Scale, SelectorInput, SelectorState,
};

use crate::acquirer::Acquirer;
use crate::calibration::CalibrationUnit;
use crate::config::{AcquireCfg, CalibrationCfg, FilterCfg, MonitorParams, StatusCfg};
use crate::error::{BuildError, MonitorError, Result};
use crate::estimator::{FilamentQuantity, estimate};
use crate::hw_error::map_hw_error;
use crate::profile::{MaterialTable, Selection};
use crate::report::{Diagnostic, Report};
use crate::status::{RollStatus, RollStatusMachine, StatusEvent};
use crate::tension::{FilterOutcome, TensionFilter};

/// Statically dispatched monitor over a concrete scale and indicator.
pub struct MonitorCore<S: Scale, I: Indicator> {
    scale: S,
    indicator: I,
    acquirer: Acquirer,
    calibration: CalibrationUnit,
    filter: TensionFilter,
    machine: RollStatusMachine,
    materials: MaterialTable,
    selection: Option<Selection>,
    selected_once: bool,
    cycle: u64,
}

impl<S: Scale, I: Indicator> core::fmt::Debug for MonitorCore<S, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MonitorCore")
            .field("cycle", &self.cycle)
            .field("status", &self.machine.status())
            .field("selection", &self.selection)
            .field("last", &self.filter.last())
            .finish_non_exhaustive()
    }
}

impl<S: Scale, I: Indicator> MonitorCore<S, I> {
    pub fn status(&self) -> RollStatus {
        self.machine.status()
    }

    pub fn calibration(&self) -> &CalibrationUnit {
        &self.calibration
    }

    pub fn filter(&self) -> &TensionFilter {
        &self.filter
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Take one acquisition burst without running a cycle.
    pub fn acquire_raw(&mut self) -> core::result::Result<f32, MonitorError> {
        self.acquirer.acquire(&mut self.scale, &mut self.indicator)
    }

    /// One full cycle against the attached hardware.
    pub fn step<Sel, Ctl>(&mut self, selector: &mut Sel, controls: &mut Ctl) -> Report
    where
        Sel: SelectorInput + ?Sized,
        Ctl: ControlInput + ?Sized,
    {
        let sel = selector.read_selector().map_err(|e| map_hw_error(&*e));
        let control = controls.poll_event();
        let raw = self.acquire_raw();
        self.process(raw, sel, control)
    }

    /// One cycle with an externally acquired raw reading.
    pub fn step_from_raw(
        &mut self,
        raw: f32,
        selector: SelectorState,
        control: Option<ControlSignal>,
    ) -> Report {
        self.process(Ok(raw), Ok(selector), control)
    }

    fn process(
        &mut self,
        raw: core::result::Result<f32, MonitorError>,
        sel: core::result::Result<SelectorState, MonitorError>,
        control: Option<ControlSignal>,
    ) -> Report {
        self.cycle += 1;
        let cycle = self.cycle;
        let mut diagnostics = Vec::new();

        self.apply_selection(sel, &mut diagnostics);

        let raw = match raw {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(cycle, error = %e, "acquisition failed; holding last reading");
                diagnostics.push(Diagnostic::Acquisition(e));
                None
            }
        };

        let restarted = self.apply_control(control, raw, &mut diagnostics);

        let mut outcome = None;
        if !restarted && let Some(raw) = raw {
            match self.calibration.net_weight(raw) {
                Ok(net) => {
                    let out = self.filter.update(net, cycle);
                    if let FilterOutcome::Artifact {
                        delta_g, streak, ..
                    } = out
                    {
                        diagnostics.push(Diagnostic::ArtifactHeld { delta_g, streak });
                    }
                    outcome = Some(out);
                }
                Err(e) => {
                    tracing::debug!(cycle, error = %e, "no net weight");
                }
            }
        }

        if !self.calibration.is_calibrated() {
            self.machine.on_uncalibrated();
            diagnostics.push(Diagnostic::UncalibratedState);
        } else if !restarted {
            self.machine.observe(outcome.as_ref());
        }

        let reading = outcome.map(|o| o.reading()).or_else(|| {
            if restarted {
                None
            } else {
                self.filter.last()
            }
        });
        let status = self.machine.status();

        let mut quantity: Option<FilamentQuantity> = None;
        if status != RollStatus::None
            && self.calibration.is_calibrated()
            && let Some(sel) = self.selection
            && let Some(r) = reading
        {
            let profile = self.materials.profile(sel.material, sel.diameter);
            let est = estimate(&r, &profile);
            if est.below_zero {
                diagnostics.push(Diagnostic::BelowZeroReading {
                    net_g: r.net_weight_g,
                });
            }
            quantity = Some(est.quantity);
        }

        tracing::debug!(
            cycle,
            %status,
            net_g = reading.map(|r| r.net_weight_g),
            remaining_g = quantity.map(|q| q.remaining_g),
            diagnostics = diagnostics.len(),
            "cycle"
        );

        Report {
            cycle,
            status,
            selection: self.selection,
            reading,
            quantity,
            diagnostics,
        }
    }

    fn apply_selection(
        &mut self,
        sel: core::result::Result<SelectorState, MonitorError>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let state = match sel {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "selector read failed; keeping previous selection");
                diagnostics.push(Diagnostic::Acquisition(e));
                return;
            }
        };
        match Selection::try_from(state) {
            Ok(selection) => {
                let changed = self.calibration.select_roll_tare(selection.roll);
                if changed && self.selected_once {
                    self.filter.reset();
                    self.machine.on_event(StatusEvent::RollTareChanged);
                }
                if self.selection != Some(selection) {
                    tracing::info!(
                        material = %selection.material,
                        diameter = %selection.diameter,
                        roll = %selection.roll,
                        "selection"
                    );
                }
                self.selection = Some(selection);
                self.selected_once = true;
            }
            Err(e) => {
                if self.selection.is_some() {
                    tracing::warn!(error = %e, "invalid selector state; quantity suppressed");
                }
                self.selection = None;
                let msg = match e {
                    MonitorError::Config(m) => m,
                    other => other.to_string(),
                };
                diagnostics.push(Diagnostic::Config(msg));
            }
        }
    }

    /// Returns true when the cycle was consumed by a restart.
    fn apply_control(
        &mut self,
        control: Option<ControlSignal>,
        raw: Option<f32>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> bool {
        match control {
            None => false,
            Some(ControlSignal::Restart) => {
                self.calibration.restart();
                self.filter.reset();
                self.machine.on_event(StatusEvent::Restart);
                true
            }
            Some(ControlSignal::SetZero) => {
                let Some(raw) = raw else {
                    tracing::warn!("set-zero ignored: no reading this cycle");
                    diagnostics.push(Diagnostic::SetZeroIgnored);
                    return false;
                };
                match self.calibration.set_zero(raw) {
                    Ok(()) => {
                        self.filter.reset();
                        self.machine.on_event(StatusEvent::Recalibrated);
                    }
                    Err(e) => diagnostics.push(Diagnostic::Acquisition(e)),
                }
                false
            }
        }
    }
}

/// Build a statically dispatched monitor from concrete hardware.
pub fn build_monitor<S, I>(scale: S, indicator: I, params: MonitorParams) -> Result<MonitorCore<S, I>>
where
    S: Scale,
    I: Indicator,
{
    let MonitorParams {
        acquire,
        filter,
        status,
        calibration,
        materials,
    } = params;

    if filter.resolution_g.is_nan() || filter.resolution_g <= 0.0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "resolution_g must be > 0",
        )));
    }
    if filter.tension_threshold_g.is_nan() || filter.tension_threshold_g <= filter.resolution_g {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "tension_threshold_g must exceed resolution_g",
        )));
    }
    if filter.artifact_accept_after == Some(0) {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "artifact_accept_after must be >= 1",
        )));
    }
    if status.idle_cycles == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "idle_cycles must be >= 1",
        )));
    }
    if acquire.read_timeout_ms == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "read_timeout_ms must be >= 1",
        )));
    }
    let acquirer = Acquirer::new(
        acquire.samples,
        Duration::from_millis(acquire.read_timeout_ms),
    )?;

    Ok(MonitorCore {
        scale,
        indicator,
        acquirer,
        calibration: CalibrationUnit::new(&calibration),
        filter: TensionFilter::new(filter),
        machine: RollStatusMachine::new(&status),
        materials,
        selection: None,
        selected_once: false,
        cycle: 0,
    })
}

/// Generic, statically-dispatched alias.
pub type MonitorG<S, I> = MonitorCore<S, I>;

/// Dynamic (boxed) monitor assembled with [`MonitorBuilder`].
pub struct Monitor {
    inner: MonitorCore<Box<dyn Scale>, Box<dyn Indicator>>,
}

impl core::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.inner, f)
    }
}

impl Monitor {
    pub fn builder() -> MonitorBuilder<Missing> {
        MonitorBuilder::default()
    }

    pub fn status(&self) -> RollStatus {
        self.inner.status()
    }

    pub fn calibration(&self) -> &CalibrationUnit {
        self.inner.calibration()
    }

    pub fn cycle(&self) -> u64 {
        self.inner.cycle()
    }

    pub fn acquire_raw(&mut self) -> core::result::Result<f32, MonitorError> {
        self.inner.acquire_raw()
    }

    pub fn step<Sel, Ctl>(&mut self, selector: &mut Sel, controls: &mut Ctl) -> Report
    where
        Sel: SelectorInput + ?Sized,
        Ctl: ControlInput + ?Sized,
    {
        self.inner.step(selector, controls)
    }

    pub fn step_from_raw(
        &mut self,
        raw: f32,
        selector: SelectorState,
        control: Option<ControlSignal>,
    ) -> Report {
        self.inner.step_from_raw(raw, selector, control)
    }
}

/// Anything that can run one monitor cycle; lets the runner drive both flavours.
pub trait Cycle {
    fn cycle_once(
        &mut self,
        selector: &mut dyn SelectorInput,
        controls: &mut dyn ControlInput,
    ) -> Report;
}

impl<S: Scale, I: Indicator> Cycle for MonitorCore<S, I> {
    fn cycle_once(
        &mut self,
        selector: &mut dyn SelectorInput,
        controls: &mut dyn ControlInput,
    ) -> Report {
        self.step(selector, controls)
    }
}

impl Cycle for Monitor {
    fn cycle_once(
        &mut self,
        selector: &mut dyn SelectorInput,
        controls: &mut dyn ControlInput,
    ) -> Report {
        self.inner.step(selector, controls)
    }
}

// Type-state markers for the builder
pub struct Missing;
pub struct Set;

/// Builder for [`Monitor`]. The scale is mandatory; everything else has defaults.
pub struct MonitorBuilder<S> {
    scale: Option<Box<dyn Scale>>,
    indicator: Option<Box<dyn Indicator>>,
    params: MonitorParams,
    _s: PhantomData<S>,
}

impl Default for MonitorBuilder<Missing> {
    fn default() -> Self {
        Self {
            scale: None,
            indicator: None,
            params: MonitorParams::default(),
            _s: PhantomData,
        }
    }
}

impl<S> MonitorBuilder<S> {
    pub fn with_indicator(mut self, indicator: impl Indicator + 'static) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    pub fn with_params(mut self, params: MonitorParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_acquire(mut self, acquire: AcquireCfg) -> Self {
        self.params.acquire = acquire;
        self
    }

    pub fn with_filter(mut self, filter: FilterCfg) -> Self {
        self.params.filter = filter;
        self
    }

    pub fn with_status(mut self, status: StatusCfg) -> Self {
        self.params.status = status;
        self
    }

    pub fn with_calibration(mut self, calibration: CalibrationCfg) -> Self {
        self.params.calibration = calibration;
        self
    }

    pub fn with_materials(mut self, materials: MaterialTable) -> Self {
        self.params.materials = materials;
        self
    }

    /// Fallible build available in any type-state.
    pub fn try_build(self) -> Result<Monitor> {
        let MonitorBuilder {
            scale,
            indicator,
            params,
            _s: _,
        } = self;
        let scale = scale.ok_or_else(|| eyre::Report::new(BuildError::MissingScale))?;
        let indicator: Box<dyn Indicator> = indicator.unwrap_or_else(|| Box::new(NoIndicator));
        let inner = build_monitor(scale, indicator, params)?;
        Ok(Monitor { inner })
    }
}

impl MonitorBuilder<Missing> {
    pub fn with_scale(self, scale: impl Scale + 'static) -> MonitorBuilder<Set> {
        let MonitorBuilder {
            scale: _,
            indicator,
            params,
            _s: _,
        } = self;
        MonitorBuilder {
            scale: Some(Box::new(scale)),
            indicator,
            params,
            _s: PhantomData,
        }
    }
}

impl MonitorBuilder<Set> {
    /// Validate and build. Only available once a scale is set.
    pub fn build(self) -> Result<Monitor> {
        self.try_build()
    }
}
