//! End-to-end cycles through the monitor core with scripted hardware.

use spool_core::mocks::{
    FailingScale, FixedSelector, RecordingIndicator, ScriptedControls, ScriptedScale,
};
use spool_core::{
    AcquireCfg, CalibrationCfg, Diagnostic, FilterCfg, MonitorCore, MonitorParams, RollClass,
    RollStatus, build_monitor,
};
use spool_traits::{ControlSignal, NoControls, SelectorState};

const ZERO: f32 = 428.0;
const TARE_1KG: f32 = 240.0;

fn params() -> MonitorParams {
    MonitorParams {
        acquire: AcquireCfg {
            samples: 1,
            read_timeout_ms: 10,
        },
        ..MonitorParams::default()
    }
}

fn monitor(p: MonitorParams) -> MonitorCore<ScriptedScale, RecordingIndicator> {
    build_monitor(ScriptedScale::new(Vec::<f32>::new()), RecordingIndicator::default(), p).unwrap()
}

fn pla175() -> SelectorState {
    SelectorState::default()
}

fn raw(net: f32) -> f32 {
    ZERO + TARE_1KG + net
}

#[test]
fn empty_mount_reads_zero_and_flags_below_zero() {
    let mut m = monitor(params());
    let r = m.step_from_raw(428.0, pla175(), None);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(-240.0));
    let q = r.quantity.expect("calibrated and selected");
    assert_eq!(q.remaining_g, 0.0);
    assert!(r.diagnostics.contains(&Diagnostic::BelowZeroReading { net_g: -240.0 }));
}

#[test]
fn pla_hundred_grams_is_about_3333_cm() {
    let mut m = monitor(params());
    let r = m.step_from_raw(raw(100.0), pla175(), None);
    let q = r.quantity.unwrap();
    assert!((q.remaining_cm - 3333.3).abs() < 1.0, "{q:?}");
    assert!((q.remaining_m - 33.33).abs() < 0.02);
    assert!(r.diagnostics.is_empty(), "{:?}", r.diagnostics);
}

#[test]
fn status_walks_none_ready_printing_ready() {
    let mut m = monitor(MonitorParams {
        status: spool_core::StatusCfg { idle_cycles: 3 },
        ..params()
    });
    assert_eq!(m.status(), RollStatus::None);
    assert_eq!(m.step_from_raw(raw(800.0), pla175(), None).status, RollStatus::Ready);
    assert_eq!(m.step_from_raw(raw(790.0), pla175(), None).status, RollStatus::Printing);
    assert_eq!(m.step_from_raw(raw(789.5), pla175(), None).status, RollStatus::Printing);
    for _ in 0..2 {
        assert_eq!(m.step_from_raw(raw(789.45), pla175(), None).status, RollStatus::Printing);
    }
    assert_eq!(m.step_from_raw(raw(789.45), pla175(), None).status, RollStatus::Ready);
}

#[test]
fn tension_spike_is_held_and_reported() {
    let mut m = monitor(params());
    m.step_from_raw(raw(800.0), pla175(), None);
    let r = m.step_from_raw(raw(700.0), pla175(), None);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(800.0));
    assert!(r.has("artifact_held"));
    assert_eq!(r.status, RollStatus::Ready);
}

#[test]
fn accepted_increase_goes_to_load_then_ready() {
    let mut m = monitor(MonitorParams {
        filter: FilterCfg {
            tension_threshold_g: 400.0,
            ..FilterCfg::default()
        },
        ..params()
    });
    m.step_from_raw(raw(500.0), pla175(), None);
    m.step_from_raw(raw(440.0), pla175(), None);
    assert_eq!(m.status(), RollStatus::Printing);
    assert_eq!(m.step_from_raw(raw(740.0), pla175(), None).status, RollStatus::Load);
    assert_eq!(m.step_from_raw(raw(740.0), pla175(), None).status, RollStatus::Ready);
}

#[test]
fn set_zero_recalibrates_then_mounted_roll_is_accepted_after_bound() {
    let mut m = monitor(params());
    m.step_from_raw(raw(300.0), pla175(), None);

    // operator lifts the roll and zeroes the empty mount
    let r = m.step_from_raw(431.0, pla175(), Some(ControlSignal::SetZero));
    assert_eq!(r.status, RollStatus::Load);
    assert_eq!(m.calibration().state().unwrap().zero_offset_raw, 431.0);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(-240.0));

    // full roll goes on: held as an artifact until the bound is reached
    let full = 431.0 + TARE_1KG + 1000.0;
    for _ in 0..3 {
        let r = m.step_from_raw(full, pla175(), None);
        assert_eq!(r.status, RollStatus::Load);
        assert_eq!(r.reading.map(|r| r.net_weight_g), Some(-240.0));
        assert!(r.has("artifact_held"));
    }
    let r = m.step_from_raw(full, pla175(), None);
    assert_eq!(r.status, RollStatus::Load);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(1000.0));

    let r = m.step_from_raw(full + 0.05, pla175(), None);
    assert_eq!(r.status, RollStatus::Ready);
    assert!((r.quantity.unwrap().remaining_kg() - 1.0).abs() < 1e-4);
}

#[test]
fn roll_mounted_several_cycles_after_set_zero_is_picked_up() {
    let mut m = monitor(params());
    let r = m.step_from_raw(431.0, pla175(), Some(ControlSignal::SetZero));
    assert_eq!(r.status, RollStatus::Load);
    for _ in 0..3 {
        let r = m.step_from_raw(431.0, pla175(), None);
        assert_eq!(r.status, RollStatus::Ready);
        assert_eq!(r.quantity.map(|q| q.remaining_g), Some(0.0));
    }

    let full = 431.0 + TARE_1KG + 1000.0;
    let mut last = None;
    for _ in 0..6 {
        last = Some(m.step_from_raw(full, pla175(), None));
    }
    let r = last.unwrap();
    assert_eq!(r.status, RollStatus::Ready);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(1000.0));
    assert!((r.quantity.unwrap().remaining_g - 1000.0).abs() < 1e-3);
}

#[test]
fn extruder_pull_while_loading_is_held() {
    let mut m = monitor(params());
    m.step_from_raw(raw(500.0), pla175(), None);
    let two_kg = SelectorState {
        roll: 1,
        ..pla175()
    };
    let tare_2kg = 250.0;
    let r = m.step_from_raw(ZERO + tare_2kg + 490.0, two_kg, None);
    assert_eq!(r.status, RollStatus::Load);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(490.0));

    let r = m.step_from_raw(ZERO + tare_2kg + 370.0, two_kg, None);
    assert_eq!(r.status, RollStatus::Load);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(490.0));
    assert!(r.has("artifact_held"));

    let r = m.step_from_raw(ZERO + tare_2kg + 490.0, two_kg, None);
    assert_eq!(r.status, RollStatus::Ready);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(490.0));
}

#[test]
fn sixty_gram_drop_is_held_at_default_threshold() {
    let mut m = monitor(params());
    assert_eq!(m.step_from_raw(raw(800.0), pla175(), None).status, RollStatus::Ready);
    let r = m.step_from_raw(raw(740.0), pla175(), None);
    assert_eq!(r.status, RollStatus::Ready);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(800.0));
    assert!(r.has("artifact_held"));
}

#[test]
fn sixty_gram_drop_prints_with_raised_threshold() {
    let mut m = monitor(MonitorParams {
        filter: FilterCfg {
            tension_threshold_g: 100.0,
            ..FilterCfg::default()
        },
        ..params()
    });
    assert_eq!(m.step_from_raw(raw(800.0), pla175(), None).status, RollStatus::Ready);
    let r = m.step_from_raw(raw(740.0), pla175(), None);
    assert_eq!(r.status, RollStatus::Printing);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(740.0));
    assert!(r.diagnostics.is_empty(), "{:?}", r.diagnostics);
}

#[test]
fn set_zero_without_reading_is_reported() {
    let mut m = build_monitor(FailingScale::timeout(), RecordingIndicator::default(), params())
        .unwrap();
    let mut sel = FixedSelector(pla175());
    let mut controls = ScriptedControls::new([(1, ControlSignal::SetZero)]);
    let r = m.step(&mut sel, &mut controls);
    assert!(r.has("acquisition"));
    assert!(r.diagnostics.contains(&Diagnostic::SetZeroIgnored));
    assert_eq!(m.calibration().state().unwrap().zero_offset_raw, ZERO);
    assert_eq!(r.status, RollStatus::None);
}

#[test]
fn restart_resets_to_none_and_defaults() {
    let mut m = monitor(params());
    m.step_from_raw(500.0, pla175(), Some(ControlSignal::SetZero));
    let r = m.step_from_raw(raw(10.0), pla175(), Some(ControlSignal::Restart));
    assert_eq!(r.status, RollStatus::None);
    assert!(!r.valid());
    assert_eq!(m.calibration().state().unwrap().zero_offset_raw, ZERO);
    assert!(m.filter().last().is_none());

    let r = m.step_from_raw(raw(10.0), pla175(), None);
    assert_eq!(r.status, RollStatus::Ready);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(10.0));
}

#[test]
fn roll_tare_change_switches_baseline_and_loads() {
    let mut m = monitor(params());
    m.step_from_raw(raw(500.0), pla175(), None);
    let two_kg = SelectorState {
        roll: 1,
        ..pla175()
    };
    let r = m.step_from_raw(raw(500.0), two_kg, None);
    assert_eq!(m.calibration().tare().class, RollClass::Kg2);
    assert_eq!(r.status, RollStatus::Load);
    assert_eq!(r.reading.map(|r| r.net_weight_g), Some(490.0));
}

#[test]
fn unknown_selector_suppresses_quantity_until_corrected() {
    let mut m = monitor(params());
    let bad = SelectorState {
        material: 7,
        ..pla175()
    };
    let r = m.step_from_raw(raw(500.0), bad, None);
    assert!(!r.valid());
    assert!(r.has("config"));
    assert!(r.selection.is_none());

    let r = m.step_from_raw(raw(500.0), bad, None);
    assert!(!r.valid());

    let r = m.step_from_raw(raw(500.0), pla175(), None);
    assert!(r.valid());
}

#[test]
fn without_default_zero_stays_none_until_set_zero() {
    let mut m = monitor(MonitorParams {
        calibration: CalibrationCfg {
            zero_offset_raw: None,
            ..CalibrationCfg::default()
        },
        ..params()
    });
    for _ in 0..3 {
        let r = m.step_from_raw(raw(500.0), pla175(), None);
        assert_eq!(r.status, RollStatus::None);
        assert!(!r.valid());
        assert!(r.diagnostics.contains(&Diagnostic::UncalibratedState));
    }
    let r = m.step_from_raw(ZERO, pla175(), Some(ControlSignal::SetZero));
    assert_eq!(r.status, RollStatus::Load);
    assert!(r.valid());
}

#[test]
fn hardware_step_drives_indicator_and_controls() {
    let mut m = build_monitor(
        ScriptedScale::new([raw(200.0), raw(200.0), raw(199.0), raw(199.0)]),
        RecordingIndicator::default(),
        MonitorParams {
            acquire: AcquireCfg {
                samples: 2,
                read_timeout_ms: 10,
            },
            ..MonitorParams::default()
        },
    )
    .unwrap();
    let mut sel = FixedSelector(pla175());
    let mut controls = ScriptedControls::new([(3, ControlSignal::Restart)]);

    assert_eq!(m.step(&mut sel, &mut controls).status, RollStatus::Ready);
    assert_eq!(m.step(&mut sel, &mut controls).status, RollStatus::Printing);
    assert_eq!(m.step(&mut sel, &mut controls).status, RollStatus::None);
    assert_eq!(m.step(&mut sel, &mut NoControls).status, RollStatus::Ready);
    assert_eq!(m.indicator().transitions().len(), 8);
    assert_eq!(m.cycle(), 4);
}
