#![no_main]
use libfuzzer_sys::fuzz_target;
use spool_config::{MaterialEntry, MaterialKind};

fuzz_target!(|input: (bool, f32, f32, Option<f32>)| {
    let (abs, diameter_mm, grams_per_cm, cm_per_gram) = input;
    let row = MaterialEntry {
        material: if abs { MaterialKind::Abs } else { MaterialKind::Pla },
        diameter_mm,
        grams_per_cm,
        cm_per_gram,
    };
    // NaN and infinities must come back as errors
    if row.validate().is_ok() {
        assert!(row.grams_per_cm.is_finite() && row.grams_per_cm > 0.0);
    }
});
