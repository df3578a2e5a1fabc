use std::time::Duration;

use rstest::rstest;
use spool_hardware::{SimulatedIndicator, SimulatedScale, SimulatedSelector};
use spool_traits::{Indicator, Scale, SelectorInput, SelectorState};

#[rstest]
#[case(0.0, 1000.0)]
#[case(0.25, 997.5)]
fn ten_reads_consume_in_order(#[case] per_read: f32, #[case] last: f32) {
    let mut s = SimulatedScale::new(1000.0).with_consumption(per_read);
    let mut v = 0.0;
    for _ in 0..10 {
        v = s.read(Duration::from_millis(1)).unwrap();
    }
    assert!((v - last).abs() < 1e-3);
    assert_eq!(s.reads(), 10);
}

#[test]
fn selector_changes_are_visible_through_clones() {
    let mut sel = SimulatedSelector::new(SelectorState::default());
    let knob = sel.clone();
    knob.set(SelectorState {
        material: 1,
        diameter: 1,
        roll: 0,
    });
    assert_eq!(sel.read_selector().unwrap().material, 1);
}

#[test]
fn boxed_devices_still_work() {
    let mut led: Box<dyn Indicator> = Box::new(SimulatedIndicator::default());
    led.set_sampling(true);
    let mut scale: Box<dyn Scale> = Box::new(SimulatedScale::new(12.0));
    assert_eq!(scale.read(Duration::from_millis(1)).unwrap(), 12.0);
}
