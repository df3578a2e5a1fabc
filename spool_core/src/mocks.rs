//! Test and helper mocks for spool_core.

use std::collections::VecDeque;
use std::time::Duration;

use spool_traits::{
    BoxError, ControlInput, ControlSignal, Indicator, Scale, SelectorInput, SelectorState,
};

/// Replays a fixed sequence of raw readings, then repeats the last one.
#[derive(Debug, Clone)]
pub struct ScriptedScale {
    queue: VecDeque<f32>,
    last: Option<f32>,
    reads: usize,
}

impl ScriptedScale {
    pub fn new(values: impl IntoIterator<Item = f32>) -> Self {
        Self {
            queue: values.into_iter().collect(),
            last: None,
            reads: 0,
        }
    }

    /// Number of `read` calls so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Scale for ScriptedScale {
    fn read(&mut self, _timeout: Duration) -> Result<f32, BoxError> {
        self.reads += 1;
        if let Some(v) = self.queue.pop_front() {
            self.last = Some(v);
        }
        self.last
            .ok_or_else(|| Box::new(std::io::Error::other("scripted scale is empty")) as BoxError)
    }
}

/// A scale whose every read fails with the given message.
#[derive(Debug, Clone)]
pub struct FailingScale {
    msg: &'static str,
}

impl FailingScale {
    pub fn new(msg: &'static str) -> Self {
        Self { msg }
    }

    pub fn timeout() -> Self {
        Self::new("sensor timeout")
    }
}

impl Scale for FailingScale {
    fn read(&mut self, _timeout: Duration) -> Result<f32, BoxError> {
        Err(Box::new(std::io::Error::other(self.msg)))
    }
}

/// Selector switches that never move.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSelector(pub SelectorState);

impl SelectorInput for FixedSelector {
    fn read_selector(&mut self) -> Result<SelectorState, BoxError> {
        Ok(self.0)
    }
}

/// Emits control events on chosen polls (1-based).
#[derive(Debug, Clone, Default)]
pub struct ScriptedControls {
    events: Vec<(u64, ControlSignal)>,
    polls: u64,
}

impl ScriptedControls {
    pub fn new(events: impl IntoIterator<Item = (u64, ControlSignal)>) -> Self {
        Self {
            events: events.into_iter().collect(),
            polls: 0,
        }
    }
}

impl ControlInput for ScriptedControls {
    fn poll_event(&mut self) -> Option<ControlSignal> {
        self.polls += 1;
        self.events
            .iter()
            .find(|(at, _)| *at == self.polls)
            .map(|&(_, sig)| sig)
    }
}

/// Records every indicator change.
#[derive(Debug, Clone, Default)]
pub struct RecordingIndicator {
    transitions: Vec<bool>,
    on: bool,
}

impl RecordingIndicator {
    pub fn transitions(&self) -> &[bool] {
        &self.transitions
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Indicator for RecordingIndicator {
    fn set_sampling(&mut self, on: bool) {
        self.on = on;
        self.transitions.push(on);
    }
}
