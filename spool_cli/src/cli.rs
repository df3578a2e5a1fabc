//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "spoolmon", version, about = "Filament spool monitor")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/spool_config.toml")]
    pub config: PathBuf,

    /// Optional material table CSV (strict header), replaces [[materials]]
    #[arg(long, value_name = "FILE")]
    pub materials: Option<PathBuf>,

    /// Print reports and errors as JSON lines instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum MaterialArg {
    Pla,
    Abs,
}

impl MaterialArg {
    pub fn selector_id(self) -> u8 {
        match self {
            Self::Pla => 0,
            Self::Abs => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RollArg {
    #[value(name = "1kg")]
    Kg1,
    #[value(name = "2kg")]
    Kg2,
}

impl RollArg {
    pub fn selector_id(self) -> u8 {
        match self {
            Self::Kg1 => 0,
            Self::Kg2 => 1,
        }
    }
}

/// Selector positions used by the simulated backend.
#[derive(clap::Args, Debug, Clone)]
pub struct SelectArgs {
    #[arg(long, value_enum, default_value = "pla")]
    pub material: MaterialArg,
    /// Filament diameter in mm (1.75 or 3.00)
    #[arg(long, value_name = "MM", default_value_t = 1.75)]
    pub diameter: f32,
    #[arg(long, value_enum, default_value = "1kg")]
    pub roll: RollArg,
}

/// Knobs for the simulated scale and buttons (ignored with the `hardware` feature).
#[derive(clap::Args, Debug, Clone)]
pub struct SimArgs {
    /// Filament on the simulated roll at start (g)
    #[arg(long = "sim-net-g", value_name = "GRAMS", default_value_t = 750.0)]
    pub net_g: f32,
    /// Filament consumed per cycle (g)
    #[arg(long = "sim-drain-g", value_name = "GRAMS", default_value_t = 0.5)]
    pub drain_g: f32,
    /// Noise amplitude per raw read (g)
    #[arg(long = "sim-jitter-g", value_name = "GRAMS", default_value_t = 0.03)]
    pub jitter_g: f32,
    /// Inject an extruder pull every N cycles (0 = never)
    #[arg(long = "sim-spike-every", value_name = "CYCLES", default_value_t = 0)]
    pub spike_every: u64,
    /// Press set-zero on this cycle
    #[arg(long = "sim-set-zero-at", value_name = "CYCLE")]
    pub set_zero_at: Option<u64>,
    /// Press restart on this cycle
    #[arg(long = "sim-restart-at", value_name = "CYCLE")]
    pub restart_at: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the monitor loop and print one report per cycle
    Monitor {
        /// Stop after this many cycles
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
        /// Override runner.period_ms
        #[arg(long = "period-ms", value_name = "MS")]
        period_ms: Option<u64>,
        /// Do not sleep between cycles (simulated time)
        #[arg(long, action = ArgAction::SetTrue)]
        fast: bool,
        #[command(flatten)]
        select: SelectArgs,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Convert a net filament weight into remaining length
    Estimate {
        /// Net filament weight in grams
        #[arg(long, allow_negative_numbers = true)]
        grams: f32,
        #[arg(long, value_enum, default_value = "pla")]
        material: MaterialArg,
        /// Filament diameter in mm (1.75 or 3.00)
        #[arg(long, value_name = "MM", default_value_t = 1.75)]
        diameter: f32,
    },
    /// Validate the config and take one acquisition burst
    SelfCheck,
}
