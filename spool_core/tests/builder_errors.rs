use spool_core::error::BuildError;
use spool_core::mocks::ScriptedScale;
use spool_core::{AcquireCfg, FilterCfg, Monitor, MonitorError, StatusCfg};
use rstest::rstest;

#[rstest]
fn builder_missing_scale_yields_typed_build_error() {
    let err = Monitor::builder()
        // missing with_scale()
        .with_filter(FilterCfg::default())
        .try_build()
        .expect_err("should fail with MissingScale");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::MissingScale) => {}
        other => panic!("expected MissingScale, got: {other:?}"),
    }
}

#[rstest]
#[case(FilterCfg { resolution_g: 0.0, ..FilterCfg::default() }, "resolution_g")]
#[case(FilterCfg { resolution_g: f32::NAN, ..FilterCfg::default() }, "resolution_g")]
#[case(FilterCfg { tension_threshold_g: 0.1, ..FilterCfg::default() }, "tension_threshold_g")]
#[case(FilterCfg { artifact_accept_after: Some(0), ..FilterCfg::default() }, "artifact_accept_after")]
fn invalid_filter_is_rejected(#[case] filter: FilterCfg, #[case] needle: &str) {
    let err = Monitor::builder()
        .with_scale(ScriptedScale::new([428.0]))
        .with_filter(filter)
        .build()
        .expect_err("invalid filter");
    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(msg)) => assert!(msg.contains(needle), "{msg}"),
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[test]
fn zero_idle_cycles_is_rejected() {
    let err = Monitor::builder()
        .with_scale(ScriptedScale::new([428.0]))
        .with_status(StatusCfg { idle_cycles: 0 })
        .build()
        .expect_err("idle_cycles 0");
    assert!(matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::InvalidConfig(_))
    ));
}

#[rstest]
#[case(0)]
#[case(-5)]
fn non_positive_sample_count_is_config_error(#[case] samples: i32) {
    let err = Monitor::builder()
        .with_scale(ScriptedScale::new([428.0]))
        .with_acquire(AcquireCfg {
            samples,
            ..AcquireCfg::default()
        })
        .build()
        .expect_err("bad sample count");
    match err.downcast_ref::<MonitorError>() {
        Some(MonitorError::Config(msg)) => assert!(msg.contains("sample count")),
        other => panic!("expected Config, got: {other:?}"),
    }
}
