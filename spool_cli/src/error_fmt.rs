//! Human-readable error descriptions and structured JSON error formatting.

use spool_core::error::{BuildError, MonitorError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScale => {
                "What happened: No scale was provided to the monitor.\nLikely causes: The HX711 scale failed to initialize or was not wired into the builder.\nHow to fix: Ensure the scale is created successfully and passed via with_scale(...).".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the [filter], [status] or [scale] sections.\nHow to fix: Edit the config file, then rerun. See etc/spool_config.toml for a sample."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::Timeout => "What happened: Scale read timed out.\nLikely causes: HX711 not wired correctly, no power/ground, or timeout too low.\nHow to fix: Verify DT/SCK pins and power, and consider increasing scale.read_timeout_ms in the config.".to_string(),
            MonitorError::Config(msg) => format!(
                "What happened: Configuration error ({msg}).\nLikely causes: Invalid sample count, unknown selector position, or a material row for an unsupported diameter.\nHow to fix: Correct the config or selector wiring and rerun."
            ),
            MonitorError::Uncalibrated => "What happened: The scale has no zero offset.\nLikely causes: scale.require_set_zero is set and set-zero was not pressed.\nHow to fix: Empty the mount and press set-zero, or configure scale.zero_offset_raw.".to_string(),
            MonitorError::Hardware(_) | MonitorError::HardwareFault(_) => format!(
                "What happened: {me}.\nLikely causes: Wiring, power, or GPIO permission problems.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let lower = msg.to_ascii_lowercase();

    if (lower.contains("hx711") && lower.contains("timeout")) || lower.contains("datareadytimeout")
    {
        return "What happened: HX711 did not produce data within the configured timeout.\nLikely causes: Wrong DT/SCK pins, wiring/power issues, or timeout configured too low.\nHow to fix: Check [pins] in the config, verify 5V/GND, and raise hardware.sensor_read_timeout_ms.".to_string();
    }

    if lower.contains("open hx711") || lower.contains("open gpio") {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    if lower.contains("material csv must have headers") {
        return "Invalid headers in material CSV. Expected 'material,diameter_mm,grams_per_cm[,cm_per_gram]'.".to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("read config") {
        let cause = err
            .chain()
            .nth(1)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid or unreadable{cause}.\nLikely causes: Missing file, TOML syntax error, or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable short name of the error class, used in JSON output.
pub fn error_kind(err: &eyre::Report) -> &'static str {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingScale => "MissingScale",
            BuildError::InvalidConfig(_) => "InvalidConfig",
        };
    }
    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return match me {
            MonitorError::Timeout => "Timeout",
            MonitorError::Config(_) => "Config",
            MonitorError::Uncalibrated => "Uncalibrated",
            MonitorError::Hardware(_) | MonitorError::HardwareFault(_) => "Hardware",
        };
    }
    "Error"
}

/// Map typed errors to stable exit codes; anything untyped returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match error_kind(err) {
        "InvalidConfig" | "Config" => 3,
        "Timeout" => 4,
        "Hardware" | "MissingScale" => 5,
        "Uncalibrated" => 6,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": error_kind(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_errors_get_stable_codes() {
        let t = eyre::Report::new(MonitorError::Timeout);
        assert_eq!(exit_code_for_error(&t), 4);
        assert!(humanize(&t).starts_with("What happened: Scale read timed out"));

        let b = eyre::Report::new(BuildError::InvalidConfig("idle_cycles must be >= 1"));
        assert_eq!(exit_code_for_error(&b), 3);
        assert!(humanize(&b).contains("idle_cycles"));
    }

    #[test]
    fn untyped_errors_fall_back() {
        let e = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&e), 1);
        assert!(humanize(&e).contains("Original: boom"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&e)).unwrap();
        assert_eq!(v["reason"], "Error");
    }

    #[test]
    fn material_csv_header_hint() {
        let e = eyre::eyre!("material CSV must have headers material,diameter_mm,grams_per_cm");
        assert!(humanize(&e).starts_with("Invalid headers in material CSV"));
    }
}
