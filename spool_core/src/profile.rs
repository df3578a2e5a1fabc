//! The configuration table: material conversion factors and roll tares.
//!
//! Reference figures (average filament densities):
//! - PLA 1.25 g/cm³, about 330 m per kg at 1.75 mm and 110 m at 3.00 mm
//! - ABS 1.04 g/cm³, about 400 m per kg at 1.75 mm and 130 m at 3.00 mm

use core::fmt;

use spool_traits::SelectorState;

use crate::error::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Pla,
    Abs,
}

impl Material {
    pub fn from_id(id: u8) -> Result<Self, MonitorError> {
        match id {
            0 => Ok(Self::Pla),
            1 => Ok(Self::Abs),
            other => Err(MonitorError::Config(format!(
                "unknown material selector {other}"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pla => "PLA",
            Self::Abs => "ABS",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diameter {
    Mm175,
    Mm300,
}

impl Diameter {
    pub fn from_id(id: u8) -> Result<Self, MonitorError> {
        match id {
            0 => Ok(Self::Mm175),
            1 => Ok(Self::Mm300),
            other => Err(MonitorError::Config(format!(
                "unknown diameter selector {other}"
            ))),
        }
    }

    /// Match a nominal diameter within 0.01 mm.
    pub fn from_mm(mm: f32) -> Option<Self> {
        if (mm - 1.75).abs() < 0.01 {
            Some(Self::Mm175)
        } else if (mm - 3.00).abs() < 0.01 {
            Some(Self::Mm300)
        } else {
            None
        }
    }

    pub fn mm(self) -> f32 {
        match self {
            Self::Mm175 => 1.75,
            Self::Mm300 => 3.00,
        }
    }
}

impl fmt::Display for Diameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} mm", self.mm())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollClass {
    Kg1,
    Kg2,
}

impl RollClass {
    pub fn from_id(id: u8) -> Result<Self, MonitorError> {
        match id {
            0 => Ok(Self::Kg1),
            1 => Ok(Self::Kg2),
            other => Err(MonitorError::Config(format!(
                "unknown roll tare selector {other}"
            ))),
        }
    }
}

impl fmt::Display for RollClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kg1 => f.write_str("1Kg"),
            Self::Kg2 => f.write_str("2Kg"),
        }
    }
}

/// Empty-spool baseline for a roll class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollTare {
    pub class: RollClass,
    pub tare_g: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TareTable {
    pub roll_1kg_g: f32,
    pub roll_2kg_g: f32,
}

impl Default for TareTable {
    fn default() -> Self {
        Self {
            roll_1kg_g: 240.0,
            // Placeholder figure; 2 kg spool weights vary by vendor.
            roll_2kg_g: 250.0,
        }
    }
}

impl TareTable {
    pub fn tare(&self, class: RollClass) -> RollTare {
        let tare_g = match class {
            RollClass::Kg1 => self.roll_1kg_g,
            RollClass::Kg2 => self.roll_2kg_g,
        };
        RollTare { class, tare_g }
    }
}

/// Conversion factors for one material and diameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProfile {
    pub material: Material,
    pub diameter: Diameter,
    pub grams_per_cm: f32,
    pub cm_per_gram: f32,
}

impl MaterialProfile {
    /// Profile with `cm_per_gram` derived as the reciprocal of `grams_per_cm`.
    pub fn new(material: Material, diameter: Diameter, grams_per_cm: f32) -> Self {
        Self {
            material,
            diameter,
            grams_per_cm,
            cm_per_gram: 1.0 / grams_per_cm,
        }
    }

    pub fn with_cm_per_gram(mut self, cm_per_gram: f32) -> Self {
        self.cm_per_gram = cm_per_gram;
        self
    }
}

/// All four material/diameter profiles; every combination is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable {
    profiles: [MaterialProfile; 4],
}

impl Default for MaterialTable {
    fn default() -> Self {
        use Diameter::*;
        use Material::*;
        Self {
            profiles: [
                MaterialProfile::new(Pla, Mm175, 0.03),
                MaterialProfile::new(Pla, Mm300, 0.09),
                MaterialProfile::new(Abs, Mm175, 0.025),
                MaterialProfile::new(Abs, Mm300, 0.076),
            ],
        }
    }
}

impl MaterialTable {
    #[inline]
    fn index(material: Material, diameter: Diameter) -> usize {
        let m = match material {
            Material::Pla => 0,
            Material::Abs => 2,
        };
        let d = match diameter {
            Diameter::Mm175 => 0,
            Diameter::Mm300 => 1,
        };
        m + d
    }

    pub fn profile(&self, material: Material, diameter: Diameter) -> MaterialProfile {
        self.profiles[Self::index(material, diameter)]
    }

    /// Replace the entry for the profile's material and diameter.
    pub fn set(&mut self, profile: MaterialProfile) {
        self.profiles[Self::index(profile.material, profile.diameter)] = profile;
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialProfile> {
        self.profiles.iter()
    }
}

/// Decoded selector switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub material: Material,
    pub diameter: Diameter,
    pub roll: RollClass,
}

impl TryFrom<SelectorState> for Selection {
    type Error = MonitorError;

    fn try_from(s: SelectorState) -> Result<Self, Self::Error> {
        Ok(Self {
            material: Material::from_id(s.material)?,
            diameter: Diameter::from_id(s.diameter)?,
            roll: RollClass::from_id(s.roll)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_reference_densities() {
        let t = MaterialTable::default();
        let pla = t.profile(Material::Pla, Diameter::Mm175);
        assert_eq!(pla.grams_per_cm, 0.03);
        assert!((pla.cm_per_gram - 33.333).abs() < 0.01);
        let abs3 = t.profile(Material::Abs, Diameter::Mm300);
        assert_eq!(abs3.grams_per_cm, 0.076);
        // ~130 m per kg
        assert!((abs3.cm_per_gram * 1000.0 / 100.0 - 131.6).abs() < 0.5);
    }

    #[test]
    fn set_replaces_only_matching_entry() {
        let mut t = MaterialTable::default();
        t.set(MaterialProfile::new(Material::Abs, Diameter::Mm175, 0.026).with_cm_per_gram(40.0));
        assert_eq!(t.profile(Material::Abs, Diameter::Mm175).cm_per_gram, 40.0);
        assert_eq!(t.profile(Material::Pla, Diameter::Mm175).grams_per_cm, 0.03);
    }

    #[test]
    fn selector_ids_decode_or_fail_with_config_error() {
        let sel = Selection::try_from(SelectorState {
            material: 1,
            diameter: 0,
            roll: 1,
        })
        .expect("valid ids");
        assert_eq!(sel.material, Material::Abs);
        assert_eq!(sel.roll, RollClass::Kg2);

        let err = Selection::try_from(SelectorState {
            material: 0,
            diameter: 2,
            roll: 0,
        })
        .expect_err("diameter 2 is unknown");
        assert!(matches!(err, MonitorError::Config(_)));
    }

    #[test]
    fn display_names_follow_panel_labels() {
        assert_eq!(Diameter::Mm300.to_string(), "3.00 mm");
        assert_eq!(Material::Pla.to_string(), "PLA");
        assert_eq!(RollClass::Kg1.to_string(), "1Kg");
        assert_eq!(TareTable::default().tare(RollClass::Kg1).tare_g, 240.0);
    }
}
