//! Weight to remaining-filament conversion.

use crate::profile::MaterialProfile;
use crate::tension::StableReading;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilamentQuantity {
    pub remaining_g: f32,
    pub remaining_cm: f32,
    pub remaining_m: f32,
}

impl FilamentQuantity {
    pub fn remaining_kg(&self) -> f32 {
        self.remaining_g / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub quantity: FilamentQuantity,
    /// Net weight was negative and has been clamped to zero.
    pub below_zero: bool,
}

/// Pure conversion; negative net weight is clamped and flagged.
pub fn estimate(reading: &StableReading, profile: &MaterialProfile) -> Estimate {
    let below_zero = reading.net_weight_g < 0.0;
    let remaining_g = reading.net_weight_g.max(0.0);
    let remaining_cm = remaining_g * profile.cm_per_gram;
    Estimate {
        quantity: FilamentQuantity {
            remaining_g,
            remaining_cm,
            remaining_m: remaining_cm / 100.0,
        },
        below_zero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Diameter, Material, MaterialTable};

    fn reading(g: f32) -> StableReading {
        StableReading {
            net_weight_g: g,
            cycle: 1,
        }
    }

    #[test]
    fn pla_175_hundred_grams() {
        let p = MaterialTable::default().profile(Material::Pla, Diameter::Mm175);
        let e = estimate(&reading(100.0), &p);
        assert!(!e.below_zero);
        assert!((e.quantity.remaining_cm - 3333.3).abs() < 0.5, "{e:?}");
        assert!((e.quantity.remaining_m - 33.33).abs() < 0.01);
        assert!((e.quantity.remaining_kg() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn negative_is_clamped_and_flagged() {
        let p = MaterialTable::default().profile(Material::Abs, Diameter::Mm300);
        let e = estimate(&reading(-240.0), &p);
        assert!(e.below_zero);
        assert_eq!(e.quantity.remaining_g, 0.0);
        assert_eq!(e.quantity.remaining_cm, 0.0);
    }
}
