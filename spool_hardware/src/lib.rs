//! Simulated and GPIO-backed devices for the spool monitor.
//!
//! The simulated devices are always available; HX711 and GPIO inputs live behind the
//! `hardware` feature.

pub mod error;
#[cfg(feature = "hardware")]
pub mod hardware;
#[cfg(feature = "hardware")]
pub mod hx711;
pub mod util;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use spool_traits::{
    BoxError, ControlInput, ControlSignal, Indicator, Scale, SelectorInput, SelectorState,
};

/// Shared handle to the simulated load on the cell (raw units).
#[derive(Debug, Clone)]
pub struct LoadHandle(Rc<Cell<f32>>);

impl LoadHandle {
    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, raw: f32) {
        self.0.set(raw);
    }

    pub fn add(&self, delta: f32) {
        self.0.set(self.0.get() + delta);
    }
}

/// Simulated load cell: a roll being consumed, with noise and extruder pulls.
///
/// Consumption, jitter and spikes are all per read, so one monitor cycle of `n`
/// samples sees `n` steps of each.
#[derive(Debug)]
pub struct SimulatedScale {
    load: LoadHandle,
    consumption_per_read: f32,
    jitter: f32,
    rng: u32,
    spike_every: u64,
    spike_len: u64,
    spike_g: f32,
    reads: u64,
}

impl SimulatedScale {
    /// Start at `raw` (zero offset + tare + filament).
    pub fn new(raw: f32) -> Self {
        Self {
            load: LoadHandle(Rc::new(Cell::new(raw))),
            consumption_per_read: 0.0,
            jitter: 0.0,
            rng: 0x9E37_79B9,
            spike_every: 0,
            spike_len: 0,
            spike_g: 0.0,
            reads: 0,
        }
    }

    pub fn with_consumption(mut self, grams_per_read: f32) -> Self {
        self.consumption_per_read = grams_per_read.max(0.0);
        self
    }

    /// Uniform noise in `[-amp, amp]` from a seeded xorshift.
    pub fn with_jitter(mut self, amp: f32, seed: u32) -> Self {
        self.jitter = amp.abs();
        self.rng = seed.max(1);
        self
    }

    /// Every `every` reads, pull `grams` off the reading for `len` reads.
    pub fn with_spikes(mut self, every: u64, len: u64, grams: f32) -> Self {
        self.spike_every = every;
        self.spike_len = len;
        self.spike_g = grams;
        self
    }

    pub fn handle(&self) -> LoadHandle {
        self.load.clone()
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    fn next_noise(&mut self) -> f32 {
        if self.jitter == 0.0 {
            return 0.0;
        }
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        let unit = (x as f32) / (u32::MAX as f32 + 1.0);
        (unit * 2.0 - 1.0) * self.jitter
    }

    fn spiking(&self) -> bool {
        self.spike_every > 0
            && self.reads >= self.spike_every
            && self.reads % self.spike_every < self.spike_len
    }
}

impl Scale for SimulatedScale {
    fn read(&mut self, _timeout: Duration) -> Result<f32, BoxError> {
        self.load.add(-self.consumption_per_read);
        let mut raw = self.load.get() + self.next_noise();
        if self.spiking() {
            raw -= self.spike_g;
        }
        self.reads += 1;
        tracing::trace!(raw, "simulated scale read");
        Ok(raw)
    }
}

/// Selector switches fixed at startup; `set` simulates the operator moving them.
#[derive(Debug, Clone)]
pub struct SimulatedSelector {
    state: Rc<Cell<SelectorState>>,
}

impl SimulatedSelector {
    pub fn new(state: SelectorState) -> Self {
        Self {
            state: Rc::new(Cell::new(state)),
        }
    }

    pub fn set(&self, state: SelectorState) {
        self.state.set(state);
    }
}

impl SelectorInput for SimulatedSelector {
    fn read_selector(&mut self) -> Result<SelectorState, BoxError> {
        Ok(self.state.get())
    }
}

/// Button presses scheduled by cycle number (1-based).
#[derive(Debug, Clone, Default)]
pub struct SimulatedControls {
    script: Vec<(u64, ControlSignal)>,
    cycle: u64,
}

impl SimulatedControls {
    pub fn new(mut script: Vec<(u64, ControlSignal)>) -> Self {
        script.sort_by_key(|(at, _)| *at);
        Self { script, cycle: 0 }
    }
}

impl ControlInput for SimulatedControls {
    fn poll_event(&mut self) -> Option<ControlSignal> {
        self.cycle += 1;
        let idx = self.script.iter().position(|(at, _)| *at == self.cycle)?;
        let (_, sig) = self.script.remove(idx);
        tracing::info!(cycle = self.cycle, ?sig, "simulated button press");
        Some(sig)
    }
}

/// Sampling LED stand-in; counts bursts.
#[derive(Debug, Clone, Default)]
pub struct SimulatedIndicator {
    on: Rc<Cell<bool>>,
    bursts: Rc<Cell<u64>>,
}

impl SimulatedIndicator {
    pub fn is_on(&self) -> bool {
        self.on.get()
    }

    pub fn bursts(&self) -> u64 {
        self.bursts.get()
    }
}

impl Indicator for SimulatedIndicator {
    fn set_sampling(&mut self, on: bool) {
        if on && !self.on.get() {
            self.bursts.set(self.bursts.get() + 1);
        }
        self.on.set(on);
        tracing::trace!(on, "sampling indicator");
    }
}
