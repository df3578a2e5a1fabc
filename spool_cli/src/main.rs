mod cli;
mod commands;
mod devices;
mod error_fmt;
mod logging;
mod output;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use spool_core::MonitorParams;

use crate::cli::{Cli, Commands, JSON_MODE, MaterialArg, RollArg, SelectArgs, SimArgs};

fn load_config(path: &Path) -> eyre::Result<spool_config::Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg: spool_config::Config = toml::from_str(&text)
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid configuration in {}", path.display()))?;
    Ok(cfg)
}

fn build_params(cli: &Cli, cfg: &spool_config::Config) -> eyre::Result<MonitorParams> {
    let mut params = MonitorParams::try_from(cfg)?;
    if let Some(path) = &cli.materials {
        let rows = spool_config::load_material_csv(path)?;
        params.materials = spool_core::conversions::material_table(&rows)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "material table loaded");
    }
    Ok(params)
}

fn run(cli: &Cli) -> eyre::Result<()> {
    let cfg = load_config(&cli.config)?;
    logging::init(cli.json, &cli.log_level, &cfg.logging)?;
    let params = build_params(cli, &cfg)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    match &cli.cmd {
        Commands::Monitor {
            cycles,
            period_ms,
            fast,
            select,
            sim,
        } => {
            let opts = commands::MonitorOpts {
                cycles: *cycles,
                period_ms: *period_ms,
                fast: *fast,
                select,
                sim,
            };
            commands::monitor(&cfg, params, &opts, cli.json, &shutdown)?;
            Ok(())
        }
        Commands::Estimate {
            grams,
            material,
            diameter,
        } => commands::estimate_cmd(&params, *grams, *material, *diameter, cli.json),
        Commands::SelfCheck => {
            let select = SelectArgs {
                material: MaterialArg::Pla,
                diameter: 1.75,
                roll: RollArg::Kg1,
            };
            let sim = SimArgs {
                net_g: 0.0,
                drain_g: 0.0,
                jitter_g: 0.0,
                spike_every: 0,
                set_zero_at: None,
                restart_at: None,
            };
            commands::self_check(&cfg, params, &select, &sim, cli.json)
        }
    }
}

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(&cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}
