//! Capability interfaces between the spool monitor core and the outside world.
//!
//! Every trait method that touches hardware returns `Box<dyn Error + Send + Sync>` so
//! backends can surface their own error types; the core maps them to typed errors.
pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Load cell source. Each call yields one raw weight unit.
pub trait Scale {
    fn read(&mut self, timeout: std::time::Duration) -> Result<f32, BoxError>;
}

/// Raw switch state of the material / diameter / roll selectors.
///
/// Ids are positional: material 0 = PLA, 1 = ABS; diameter 0 = 1.75 mm, 1 = 3.00 mm;
/// roll 0 = 1 kg, 1 = 2 kg. Anything else is rejected by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectorState {
    pub material: u8,
    pub diameter: u8,
    pub roll: u8,
}

/// Polled once per cycle for the active roll selection.
pub trait SelectorInput {
    fn read_selector(&mut self) -> Result<SelectorState, BoxError>;
}

/// Debounced, edge-triggered operator buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    Restart,
    SetZero,
}

pub trait ControlInput {
    /// At most one event per cycle; `None` when nothing was pressed.
    fn poll_event(&mut self) -> Option<ControlSignal>;
}

/// "Currently sampling" output, typically an LED.
pub trait Indicator {
    fn set_sampling(&mut self, on: bool);
}

/// Indicator that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn set_sampling(&mut self, _on: bool) {}
}

/// Control source that never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoControls;

impl ControlInput for NoControls {
    fn poll_event(&mut self) -> Option<ControlSignal> {
        None
    }
}

impl<T: Scale + ?Sized> Scale for Box<T> {
    fn read(&mut self, timeout: std::time::Duration) -> Result<f32, BoxError> {
        (**self).read(timeout)
    }
}

impl<T: SelectorInput + ?Sized> SelectorInput for Box<T> {
    fn read_selector(&mut self) -> Result<SelectorState, BoxError> {
        (**self).read_selector()
    }
}

impl<T: ControlInput + ?Sized> ControlInput for Box<T> {
    fn poll_event(&mut self) -> Option<ControlSignal> {
        (**self).poll_event()
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set_sampling(&mut self, on: bool) {
        (**self).set_sampling(on)
    }
}
