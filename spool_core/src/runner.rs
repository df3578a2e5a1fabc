//! Fixed-tick monitor loop.
//!
//! The loop is the single writer of monitor state. Reports leave through a bounded
//! channel; a full channel drops the report instead of stalling the tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use spool_traits::{Clock, ControlInput, SelectorInput};

use crate::monitor::Cycle;
use crate::report::Report;

#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    /// Tick length; the burst time counts against it.
    pub period: Duration,
    /// Stop after this many cycles.
    pub max_cycles: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(1000),
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    CycleLimit,
    ConsumerGone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub dropped: u64,
    pub stop: StopReason,
}

/// Bounded report channel; capacity is clamped to at least one slot.
pub fn report_channel(capacity: usize) -> (xch::Sender<Report>, xch::Receiver<Report>) {
    xch::bounded(capacity.max(1))
}

/// Sleep needed to finish a tick that started `elapsed` ago.
#[inline]
fn remaining(period: Duration, elapsed: Duration) -> Duration {
    period.saturating_sub(elapsed)
}

/// Run cycles until shutdown, the cycle limit, or the consumer hangs up.
pub fn run<M, C>(
    monitor: &mut M,
    selector: &mut dyn SelectorInput,
    controls: &mut dyn ControlInput,
    tx: &xch::Sender<Report>,
    clock: &C,
    params: &RunParams,
    shutdown: &AtomicBool,
) -> RunSummary
where
    M: Cycle + ?Sized,
    C: Clock + ?Sized,
{
    let mut cycles = 0u64;
    let mut dropped = 0u64;
    tracing::info!(
        period_ms = params.period.as_millis() as u64,
        max_cycles = params.max_cycles,
        "monitor start"
    );

    let stop = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Shutdown;
        }
        if let Some(max) = params.max_cycles
            && cycles >= max
        {
            break StopReason::CycleLimit;
        }

        let start = clock.now();
        let report = monitor.cycle_once(selector, controls);
        cycles += 1;

        match tx.try_send(report) {
            Ok(()) => {}
            Err(xch::TrySendError::Full(r)) => {
                dropped += 1;
                tracing::debug!(cycle = r.cycle, "report channel full; dropped");
            }
            Err(xch::TrySendError::Disconnected(_)) => break StopReason::ConsumerGone,
        }

        let elapsed = clock.now().saturating_duration_since(start);
        clock.sleep(remaining(params.period, elapsed));
    };

    tracing::info!(cycles, dropped, ?stop, "monitor stopped");
    RunSummary {
        cycles,
        dropped,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::remaining;
    use std::time::Duration;

    #[test]
    fn remaining_saturates() {
        let p = Duration::from_millis(100);
        assert_eq!(remaining(p, Duration::from_millis(30)), Duration::from_millis(70));
        assert_eq!(remaining(p, Duration::from_millis(300)), Duration::ZERO);
    }
}
