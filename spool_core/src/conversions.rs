//! Conversions from the `spool_config` schema into engine configuration.

use crate::config::{AcquireCfg, CalibrationCfg, FilterCfg, MonitorParams, StatusCfg};
use crate::error::MonitorError;
use crate::profile::{Diameter, Material, MaterialProfile, MaterialTable, TareTable};

// ── Scalar sections ──────────────────────────────────────────────────────────

impl From<&spool_config::ScaleCfg> for AcquireCfg {
    fn from(c: &spool_config::ScaleCfg) -> Self {
        Self {
            samples: c.samples,
            read_timeout_ms: c.read_timeout_ms,
        }
    }
}

impl From<&spool_config::FilterCfg> for FilterCfg {
    fn from(c: &spool_config::FilterCfg) -> Self {
        Self {
            resolution_g: c.resolution_g,
            tension_threshold_g: c.tension_threshold_g,
            artifact_accept_after: c.artifact_accept_after,
        }
    }
}

impl From<&spool_config::StatusCfg> for StatusCfg {
    fn from(c: &spool_config::StatusCfg) -> Self {
        Self {
            idle_cycles: c.idle_cycles,
        }
    }
}

impl From<&spool_config::TareCfg> for TareTable {
    fn from(c: &spool_config::TareCfg) -> Self {
        Self {
            roll_1kg_g: c.roll_1kg_g,
            roll_2kg_g: c.roll_2kg_g,
        }
    }
}

// ── Material table ───────────────────────────────────────────────────────────

impl From<spool_config::MaterialKind> for Material {
    fn from(k: spool_config::MaterialKind) -> Self {
        match k {
            spool_config::MaterialKind::Pla => Self::Pla,
            spool_config::MaterialKind::Abs => Self::Abs,
        }
    }
}

impl TryFrom<&spool_config::MaterialEntry> for MaterialProfile {
    type Error = MonitorError;

    fn try_from(e: &spool_config::MaterialEntry) -> Result<Self, Self::Error> {
        let diameter = Diameter::from_mm(e.diameter_mm).ok_or_else(|| {
            MonitorError::Config(format!("no profile for diameter {} mm", e.diameter_mm))
        })?;
        let profile = MaterialProfile::new(e.material.into(), diameter, e.grams_per_cm);
        Ok(match e.cm_per_gram {
            Some(cm) => profile.with_cm_per_gram(cm),
            None => profile,
        })
    }
}

/// Default table with `entries` layered on top.
pub fn material_table(
    entries: &[spool_config::MaterialEntry],
) -> Result<MaterialTable, MonitorError> {
    let mut table = MaterialTable::default();
    for e in entries {
        table.set(MaterialProfile::try_from(e)?);
    }
    Ok(table)
}

// ── Whole config ─────────────────────────────────────────────────────────────

impl TryFrom<&spool_config::Config> for MonitorParams {
    type Error = MonitorError;

    fn try_from(c: &spool_config::Config) -> Result<Self, Self::Error> {
        Ok(Self {
            acquire: (&c.scale).into(),
            filter: (&c.filter).into(),
            status: (&c.status).into(),
            calibration: CalibrationCfg {
                zero_offset_raw: (!c.scale.require_set_zero).then_some(c.scale.zero_offset_raw),
                tare: (&c.tare).into(),
            },
            materials: material_table(&c.materials)?,
        })
    }
}
