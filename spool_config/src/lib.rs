#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and material-table parsing for the spool monitor.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The material table CSV loader enforces headers before any row is parsed.
//!
//! Every section has defaults matching the reference rig (428.0 raw zero, 1 kg roll
//! tare 240 g, 10 samples per cycle, 0.15 g resolution, 50 g tension ceiling), so an
//! empty file is a valid configuration.
use serde::Deserialize;

/// Diameters the selector hardware can express, in millimetres.
pub const KNOWN_DIAMETERS_MM: [f32; 2] = [1.75, 3.00];

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    #[serde(alias = "PLA")]
    Pla,
    #[serde(alias = "ABS")]
    Abs,
}

/// One row of the material conversion table.
///
/// TOML:
/// ```toml
/// [[materials]]
/// material = "pla"
/// diameter_mm = 1.75
/// grams_per_cm = 0.03
/// ```
///
/// CSV headers: `material,diameter_mm,grams_per_cm[,cm_per_gram]`
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct MaterialEntry {
    pub material: MaterialKind,
    pub diameter_mm: f32,
    pub grams_per_cm: f32,
    /// Explicit length per gram; derived as `1 / grams_per_cm` when absent.
    #[serde(default)]
    pub cm_per_gram: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    pub hx711_dt: u8,
    pub hx711_sck: u8,
    pub material: u8,
    pub diameter: u8,
    pub roll: u8,
    pub restart: u8,
    pub set_zero: u8,
    pub reading_led: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            hx711_dt: 5,
            hx711_sck: 6,
            material: 7,
            diameter: 9,
            roll: 11,
            restart: 14,
            set_zero: 12,
            reading_led: Some(13),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScaleCfg {
    /// Raw samples averaged per cycle. Signed so a bad value reaches validation
    /// instead of failing to parse.
    pub samples: i32,
    /// Raw reading of the empty mount.
    pub zero_offset_raw: f32,
    /// Start uncalibrated and wait for an operator set-zero.
    pub require_set_zero: bool,
    /// Per-read sensor timeout (ms).
    pub read_timeout_ms: u64,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            samples: 10,
            zero_offset_raw: 428.0,
            require_set_zero: false,
            read_timeout_ms: 150,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Smallest net change reported as a real update (g).
    pub resolution_g: f32,
    /// Changes at or above this are treated as extruder pull (g).
    pub tension_threshold_g: f32,
    /// Accept an artifact-band reading after this many consecutive held artifacts.
    /// Picks up a roll mounted after set-zero; defaults to 3.
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StatusCfg {
    /// Cycles without an accepted decrease before PRINTING falls back to READY.
    pub idle_cycles: u32,
}

impl Default for StatusCfg {
    fn default() -> Self {
        Self { idle_cycles: 10 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TareCfg {
    pub roll_1kg_g: f32,
    pub roll_2kg_g: f32,
}

impl Default for TareCfg {
    fn default() -> Self {
        Self {
            roll_1kg_g: 240.0,
            roll_2kg_g: 250.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Control loop tick (ms).
    pub period_ms: u64,
    /// Reports buffered for the display consumer; further reports are dropped.
    pub report_buffer: usize,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            period_ms: 1000,
            report_buffer: 16,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// Max time to wait for HX711 data-ready (DT low) before failing
    pub sensor_read_timeout_ms: u64,
    /// Grams per HX711 count.
    pub units_per_count: f32,
    /// Buttons pull the line low when pressed.
    pub buttons_active_low: bool,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            sensor_read_timeout_ms: 150,
            units_per_count: 1.0,
            buttons_active_low: true,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub scale: ScaleCfg,
    pub filter: FilterCfg,
    pub status: StatusCfg,
    pub tare: TareCfg,
    /// Overrides for the built-in material table, keyed by (material, diameter).
    pub materials: Vec<MaterialEntry>,
    pub runner: RunnerCfg,
    pub logging: Logging,
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn is_known_diameter(d: f32) -> bool {
    KNOWN_DIAMETERS_MM.iter().any(|k| (k - d).abs() < 0.01)
}

impl MaterialEntry {
    pub fn validate(&self) -> eyre::Result<()> {
        if !is_known_diameter(self.diameter_mm) {
            eyre::bail!(
                "material diameter_mm must be one of 1.75 or 3.00, got {}",
                self.diameter_mm
            );
        }
        if !self.grams_per_cm.is_finite() || self.grams_per_cm <= 0.0 {
            eyre::bail!("material grams_per_cm must be > 0");
        }
        if let Some(cm) = self.cm_per_gram
            && (!cm.is_finite() || cm <= 0.0)
        {
            eyre::bail!("material cm_per_gram must be > 0");
        }
        Ok(())
    }
}

/// Load a material table CSV with strict headers.
///
/// Expected headers:
/// material,diameter_mm,grams_per_cm
///
/// An optional fourth `cm_per_gram` column is accepted.
pub fn load_material_csv(path: &std::path::Path) -> eyre::Result<Vec<MaterialEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open material CSV {:?}: {}", path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    let required = ["material", "diameter_mm", "grams_per_cm"];
    let ok = match actual.len() {
        3 => actual == required,
        4 => actual[..3] == required && actual[3] == "cm_per_gram",
        _ => false,
    };
    if !ok {
        eyre::bail!(
            "material CSV must have headers 'material,diameter_mm,grams_per_cm[,cm_per_gram]', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<MaterialEntry>().enumerate() {
        match rec {
            Ok(row) => {
                row.validate()
                    .map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("material CSV {:?} has no rows", path);
    }
    Ok(rows)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Scale
        if self.scale.samples < 1 {
            eyre::bail!("scale.samples must be >= 1");
        }
        if !self.scale.zero_offset_raw.is_finite() {
            eyre::bail!("scale.zero_offset_raw must be finite");
        }
        if self.scale.read_timeout_ms == 0 {
            eyre::bail!("scale.read_timeout_ms must be >= 1");
        }

        // Filter
        if !self.filter.resolution_g.is_finite() || self.filter.resolution_g <= 0.0 {
            eyre::bail!("filter.resolution_g must be > 0");
        }
        if !self.filter.tension_threshold_g.is_finite()
            || self.filter.tension_threshold_g <= self.filter.resolution_g
        {
            eyre::bail!("filter.tension_threshold_g must be greater than filter.resolution_g");
        }
        if self.filter.artifact_accept_after == Some(0) {
            eyre::bail!("filter.artifact_accept_after must be >= 1 when set");
        }

        // Status
        if self.status.idle_cycles == 0 {
            eyre::bail!("status.idle_cycles must be >= 1");
        }

        // Tare
        for (name, v) in [
            ("tare.roll_1kg_g", self.tare.roll_1kg_g),
            ("tare.roll_2kg_g", self.tare.roll_2kg_g),
        ] {
            if !v.is_finite() || v < 0.0 {
                eyre::bail!("{name} must be >= 0");
            }
        }

        // Materials
        for (i, m) in self.materials.iter().enumerate() {
            m.validate()
                .map_err(|e| eyre::eyre!("materials[{i}]: {e}"))?;
            let dup = self.materials[..i].iter().any(|o| {
                o.material == m.material && (o.diameter_mm - m.diameter_mm).abs() < 0.01
            });
            if dup {
                eyre::bail!("materials[{i}]: duplicate entry for this material and diameter");
            }
        }

        // Runner
        if self.runner.period_ms == 0 {
            eyre::bail!("runner.period_ms must be >= 1");
        }
        if self.runner.report_buffer == 0 {
            eyre::bail!("runner.report_buffer must be >= 1");
        }

        // Hardware
        if self.hardware.sensor_read_timeout_ms == 0 {
            eyre::bail!("hardware.sensor_read_timeout_ms must be >= 1");
        }
        if !self.hardware.units_per_count.is_finite() || self.hardware.units_per_count == 0.0 {
            eyre::bail!("hardware.units_per_count must be finite and non-zero");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref()
            && !matches!(r, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        Ok(())
    }
}
