//! Subcommand bodies.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::{WrapErr, eyre};
use spool_core::runner::{RunParams, RunSummary, StopReason, report_channel};
use spool_core::{Diameter, Material, Monitor, MonitorParams, StableReading, estimate};
use spool_traits::{ManualClock, MonotonicClock};

use crate::cli::{MaterialArg, SelectArgs, SimArgs};
use crate::devices;
use crate::output;

pub struct MonitorOpts<'a> {
    pub cycles: Option<u64>,
    pub period_ms: Option<u64>,
    pub fast: bool,
    pub select: &'a SelectArgs,
    pub sim: &'a SimArgs,
}

pub fn monitor(
    cfg: &spool_config::Config,
    params: MonitorParams,
    opts: &MonitorOpts<'_>,
    json: bool,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<RunSummary> {
    let dev = devices::open(cfg, opts.select, opts.sim)?;
    let mut monitor = Monitor::builder()
        .with_scale(dev.scale)
        .with_indicator(dev.indicator)
        .with_params(params)
        .build()?;
    let mut selector = dev.selector;
    let mut controls = dev.controls;

    let run = RunParams {
        period: Duration::from_millis(opts.period_ms.unwrap_or(cfg.runner.period_ms).max(1)),
        max_cycles: opts.cycles,
    };
    let (tx, rx) = report_channel(cfg.runner.report_buffer);

    let printer = std::thread::Builder::new()
        .name("spool-report".into())
        .spawn(move || {
            for report in rx {
                if json {
                    println!("{}", output::report_json(&report));
                } else {
                    println!("{}", output::render_line(&report));
                }
            }
        })
        .wrap_err("spawn report printer")?;

    let summary = if opts.fast {
        spool_core::runner::run(
            &mut monitor,
            selector.as_mut(),
            controls.as_mut(),
            &tx,
            &ManualClock::new(),
            &run,
            shutdown,
        )
    } else {
        spool_core::runner::run(
            &mut monitor,
            selector.as_mut(),
            controls.as_mut(),
            &tx,
            &MonotonicClock::new(),
            &run,
            shutdown,
        )
    };
    drop(tx);
    printer
        .join()
        .map_err(|_| eyre!("report printer panicked"))?;

    let reason = match summary.stop {
        StopReason::Shutdown => "shutdown",
        StopReason::CycleLimit => "cycle limit",
        StopReason::ConsumerGone => "consumer gone",
    };
    if !json {
        eprintln!("monitor stopped after {} cycles ({reason})", summary.cycles);
    }
    Ok(summary)
}

pub fn estimate_cmd(
    params: &MonitorParams,
    grams: f32,
    material: MaterialArg,
    diameter_mm: f32,
    json: bool,
) -> eyre::Result<()> {
    if !grams.is_finite() {
        return Err(eyre!("--grams must be a finite number"));
    }
    let diameter = Diameter::from_mm(diameter_mm).ok_or_else(|| {
        spool_core::MonitorError::Config(format!("no profile for diameter {diameter_mm} mm"))
    })?;
    let material = match material {
        MaterialArg::Pla => Material::Pla,
        MaterialArg::Abs => Material::Abs,
    };
    let profile = params.materials.profile(material, diameter);
    let est = estimate(
        &StableReading {
            net_weight_g: grams,
            cycle: 0,
        },
        &profile,
    );
    if json {
        println!("{}", output::estimate_json(&profile, grams, &est));
    } else {
        println!("{}", output::render_estimate(&profile, grams, &est));
    }
    Ok(())
}

pub fn self_check(
    cfg: &spool_config::Config,
    params: MonitorParams,
    select: &SelectArgs,
    sim: &SimArgs,
    json: bool,
) -> eyre::Result<()> {
    let dev = devices::open(cfg, select, sim)?;
    let mut monitor = Monitor::builder()
        .with_scale(dev.scale)
        .with_indicator(dev.indicator)
        .with_params(params)
        .build()?;
    let raw = monitor.acquire_raw()?;
    let net = monitor.calibration().net_weight(raw).ok();
    if json {
        println!(
            "{}",
            serde_json::json!({ "ok": true, "raw": raw, "net_g": net })
        );
    } else {
        match net {
            Some(n) => println!("self-check ok: raw {raw:.2}, net {n:.2} g"),
            None => println!("self-check ok: raw {raw:.2} (uncalibrated)"),
        }
    }
    Ok(())
}
