//! Device assembly: simulated by default, GPIO with the `hardware` feature.

use spool_traits::{BoxError, ControlInput, Indicator, Scale, SelectorInput};

use crate::cli::{SelectArgs, SimArgs};

pub struct Devices {
    pub scale: Box<dyn Scale>,
    pub indicator: Box<dyn Indicator>,
    pub selector: Box<dyn SelectorInput>,
    pub controls: Box<dyn ControlInput>,
}

/// Test hook: `SPOOL_TEST_SIM_TIMEOUT=1` makes every simulated read time out.
fn sim_timeout_requested() -> bool {
    std::env::var("SPOOL_TEST_SIM_TIMEOUT").is_ok_and(|v| v == "1")
}

struct TimeoutScale;

impl Scale for TimeoutScale {
    fn read(&mut self, _timeout: std::time::Duration) -> Result<f32, BoxError> {
        Err(Box::new(spool_hardware::error::HwError::DataReadyTimeout))
    }
}

#[cfg(not(feature = "hardware"))]
pub fn open(
    cfg: &spool_config::Config,
    select: &SelectArgs,
    sim: &SimArgs,
) -> eyre::Result<Devices> {
    use spool_core::Diameter;
    use spool_hardware::{SimulatedControls, SimulatedIndicator, SimulatedScale, SimulatedSelector};
    use spool_traits::{ControlSignal, SelectorState};

    let diameter = match Diameter::from_mm(select.diameter) {
        Some(Diameter::Mm175) => 0,
        Some(Diameter::Mm300) => 1,
        // out-of-range position, reported by the core as a config diagnostic
        None => 2,
    };
    let selector = SimulatedSelector::new(SelectorState {
        material: select.material.selector_id(),
        diameter,
        roll: select.roll.selector_id(),
    });

    let scale: Box<dyn Scale> = if sim_timeout_requested() {
        Box::new(TimeoutScale)
    } else {
        let samples = u64::try_from(cfg.scale.samples.max(1)).unwrap_or(1);
        let tare = match select.roll {
            crate::cli::RollArg::Kg1 => cfg.tare.roll_1kg_g,
            crate::cli::RollArg::Kg2 => cfg.tare.roll_2kg_g,
        };
        let start = cfg.scale.zero_offset_raw + tare + sim.net_g;
        let mut s = SimulatedScale::new(start)
            .with_consumption(sim.drain_g / samples as f32)
            .with_jitter(sim.jitter_g, 0x5EED);
        if sim.spike_every > 0 {
            s = s.with_spikes(sim.spike_every * samples, samples, 120.0);
        }
        Box::new(s)
    };

    let mut script = Vec::new();
    if let Some(at) = sim.set_zero_at {
        script.push((at, ControlSignal::SetZero));
    }
    if let Some(at) = sim.restart_at {
        script.push((at, ControlSignal::Restart));
    }
    tracing::info!(backend = "simulated", "devices ready");
    Ok(Devices {
        scale,
        indicator: Box::new(SimulatedIndicator::default()),
        selector: Box::new(selector),
        controls: Box::new(SimulatedControls::new(script)),
    })
}

#[cfg(feature = "hardware")]
pub fn open(
    cfg: &spool_config::Config,
    _select: &SelectArgs,
    _sim: &SimArgs,
) -> eyre::Result<Devices> {
    use eyre::WrapErr;
    use std::time::Duration;
    use spool_hardware::hardware::{GpioControls, GpioIndicator, GpioSelector, HardwareScale};
    use spool_traits::NoIndicator;

    let p = &cfg.pins;
    let scale: Box<dyn Scale> = if sim_timeout_requested() {
        Box::new(TimeoutScale)
    } else {
        Box::new(
            HardwareScale::try_new(
                p.hx711_dt,
                p.hx711_sck,
                cfg.hardware.units_per_count,
                Duration::from_millis(cfg.hardware.sensor_read_timeout_ms),
            )
            .wrap_err("open hx711")?,
        )
    };
    let indicator: Box<dyn Indicator> = match p.reading_led {
        Some(pin) => Box::new(GpioIndicator::try_new(pin).wrap_err("open gpio (reading_led)")?),
        None => Box::new(NoIndicator),
    };
    let selector =
        GpioSelector::try_new(p.material, p.diameter, p.roll).wrap_err("open gpio (selector)")?;
    let controls = GpioControls::try_new(p.restart, p.set_zero, cfg.hardware.buttons_active_low)
        .wrap_err("open gpio (buttons)")?;
    tracing::info!(backend = "gpio", "devices ready");
    Ok(Devices {
        scale,
        indicator,
        selector: Box::new(selector),
        controls: Box::new(controls),
    })
}
