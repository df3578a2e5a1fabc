//! Report rendering for the terminal and for JSON lines.

use serde_json::{Value, json};
use spool_core::{Estimate, MaterialProfile, Report, RollStatus};

/// Panel line, e.g. `#  12 Run   PLA 1.75 mm Roll 1Kg   742.50 gr  24750 cm  247.50 m  0.743 Kg`.
pub fn render_line(r: &Report) -> String {
    let status = r.status.label().unwrap_or("----");
    let selection = match r.selection {
        Some(s) => format!("{} {} Roll {}", s.material, s.diameter, s.roll),
        None => "no profile".to_string(),
    };
    let figures = match r.quantity {
        Some(q) => format!(
            "{:>8.2} gr {:>7.0} cm {:>7.2} m {:>6.3} Kg",
            q.remaining_g,
            q.remaining_cm,
            q.remaining_m,
            q.remaining_kg()
        ),
        None => "      -- no reading --".to_string(),
    };
    let mut line = format!("#{:>4} {status:<5} {selection:<22} {figures}", r.cycle);
    for d in &r.diagnostics {
        line.push_str(&format!("  [{d}]"));
    }
    line
}

fn status_name(s: RollStatus) -> &'static str {
    match s {
        RollStatus::None => "none",
        RollStatus::Ready => "ready",
        RollStatus::Printing => "printing",
        RollStatus::Load => "load",
    }
}

pub fn report_json(r: &Report) -> Value {
    let diagnostics: Vec<Value> = r
        .diagnostics
        .iter()
        .map(|d| json!({ "code": d.code(), "message": d.to_string() }))
        .collect();
    json!({
        "cycle": r.cycle,
        "status": status_name(r.status),
        "label": r.status.label(),
        "valid": r.valid(),
        "material": r.selection.map(|s| s.material.name()),
        "diameter_mm": r.selection.map(|s| s.diameter.mm()),
        "roll": r.selection.map(|s| s.roll.to_string()),
        "net_g": r.reading.map(|x| x.net_weight_g),
        "remaining_g": r.quantity.map(|q| q.remaining_g),
        "remaining_cm": r.quantity.map(|q| q.remaining_cm),
        "remaining_m": r.quantity.map(|q| q.remaining_m),
        "diagnostics": diagnostics,
    })
}

pub fn render_estimate(p: &MaterialProfile, grams: f32, e: &Estimate) -> String {
    let mut s = format!(
        "{} {}: {:.2} gr -> {:.2} cm ({:.2} m)",
        p.material, p.diameter, e.quantity.remaining_g, e.quantity.remaining_cm, e.quantity.remaining_m
    );
    if e.below_zero {
        s.push_str(&format!("  [net weight {grams:.2} g below zero]"));
    }
    s
}

pub fn estimate_json(p: &MaterialProfile, grams: f32, e: &Estimate) -> Value {
    json!({
        "material": p.material.name(),
        "diameter_mm": p.diameter.mm(),
        "grams_per_cm": p.grams_per_cm,
        "cm_per_gram": p.cm_per_gram,
        "net_g": grams,
        "remaining_g": e.quantity.remaining_g,
        "remaining_cm": e.quantity.remaining_cm,
        "remaining_m": e.quantity.remaining_m,
        "below_zero": e.below_zero,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use spool_core::{Diagnostic, FilamentQuantity, RollStatus, StableReading};

    fn report() -> Report {
        Report {
            cycle: 3,
            status: RollStatus::Printing,
            selection: None,
            reading: Some(StableReading {
                net_weight_g: 100.0,
                cycle: 3,
            }),
            quantity: Some(FilamentQuantity {
                remaining_g: 100.0,
                remaining_cm: 3333.3,
                remaining_m: 33.33,
            }),
            diagnostics: vec![Diagnostic::ArtifactHeld {
                delta_g: -120.0,
                streak: 1,
            }],
        }
    }

    #[test]
    fn line_uses_panel_units_and_labels() {
        let line = render_line(&report());
        assert!(line.contains("Run"), "{line}");
        assert!(line.contains("gr") && line.contains(" cm") && line.contains("Kg"));
        assert!(line.contains("tension artifact"));
    }

    #[test]
    fn json_has_nullable_selection() {
        let v = report_json(&report());
        assert_eq!(v["status"], "printing");
        assert_eq!(v["label"], "Run");
        assert!(v["material"].is_null());
        assert_eq!(v["diagnostics"][0]["code"], "artifact_held");
    }
}
