//! Roll status state machine.
//!
//! ```text
//!   NONE ──first reading──▶ READY ──accepted decrease──▶ PRINTING
//!                             ▲                             │
//!                             └──── idle_cycles w/o drop ───┘
//!   any ──set-zero / tare change / accepted increase──▶ LOAD ──steady──▶ READY
//!   any ──restart──▶ NONE
//! ```

use core::fmt;

use crate::config::StatusCfg;
use crate::tension::FilterOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollStatus {
    #[default]
    None,
    Ready,
    Printing,
    Load,
}

impl RollStatus {
    /// Host display string; `None` has no label.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Ready => Some("Ready"),
            Self::Printing => Some("Run"),
            Self::Load => Some("Load"),
        }
    }
}

impl fmt::Display for RollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Ready => "READY",
            Self::Printing => "PRINTING",
            Self::Load => "LOAD",
        };
        f.write_str(s)
    }
}

/// Operator and selector events that drive the machine independent of readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEvent {
    Recalibrated,
    RollTareChanged,
    Restart,
}

#[derive(Debug, Clone)]
pub struct RollStatusMachine {
    status: RollStatus,
    idle_cycles: u32,
    idle: u32,
}

impl RollStatusMachine {
    pub fn new(cfg: &StatusCfg) -> Self {
        Self {
            status: RollStatus::None,
            idle_cycles: cfg.idle_cycles.max(1),
            idle: 0,
        }
    }

    pub fn status(&self) -> RollStatus {
        self.status
    }

    pub fn on_event(&mut self, event: StatusEvent) -> RollStatus {
        let next = match event {
            StatusEvent::Restart => RollStatus::None,
            StatusEvent::Recalibrated | StatusEvent::RollTareChanged => RollStatus::Load,
        };
        self.transition(next, "event");
        self.status
    }

    /// No usable calibration: hold in NONE.
    pub fn on_uncalibrated(&mut self) {
        self.transition(RollStatus::None, "uncalibrated");
    }

    /// Feed this cycle's filter outcome; `None` when no reading was produced.
    pub fn observe(&mut self, outcome: Option<&FilterOutcome>) -> RollStatus {
        let delta = outcome.and_then(FilterOutcome::accepted_delta);
        if let Some(d) = delta
            && d > 0.0
        {
            self.transition(RollStatus::Load, "mass added");
            return self.status;
        }

        let next = match (self.status, outcome) {
            (RollStatus::None, Some(_)) => RollStatus::Ready,
            (RollStatus::None, None) => RollStatus::None,
            (RollStatus::Ready, _) if delta.is_some() => RollStatus::Printing,
            (RollStatus::Ready, _) => RollStatus::Ready,
            (RollStatus::Printing, _) if delta.is_some() => {
                self.idle = 0;
                RollStatus::Printing
            }
            (RollStatus::Printing, _) => {
                self.idle += 1;
                if self.idle >= self.idle_cycles {
                    RollStatus::Ready
                } else {
                    RollStatus::Printing
                }
            }
            (RollStatus::Load, Some(FilterOutcome::Steady(_))) => RollStatus::Ready,
            (RollStatus::Load, _) => RollStatus::Load,
        };
        self.transition(next, "reading");
        self.status
    }

    fn transition(&mut self, next: RollStatus, cause: &'static str) {
        if next == self.status {
            return;
        }
        tracing::info!(from = %self.status, to = %next, cause, "roll status changed");
        self.status = next;
        self.idle = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tension::StableReading;

    fn r(g: f32, cycle: u64) -> StableReading {
        StableReading {
            net_weight_g: g,
            cycle,
        }
    }

    fn accepted(from: f32, to: f32) -> FilterOutcome {
        FilterOutcome::Accepted {
            previous: r(from, 0),
            current: r(to, 1),
        }
    }

    fn machine(idle: u32) -> RollStatusMachine {
        RollStatusMachine::new(&StatusCfg { idle_cycles: idle })
    }

    #[test]
    fn none_to_ready_to_printing() {
        let mut m = machine(10);
        assert_eq!(m.observe(Some(&FilterOutcome::Baseline(r(800.0, 1)))), RollStatus::Ready);
        assert_eq!(m.observe(Some(&accepted(800.0, 740.0))), RollStatus::Printing);
    }

    #[test]
    fn no_reading_keeps_none() {
        let mut m = machine(10);
        assert_eq!(m.observe(None), RollStatus::None);
    }

    #[test]
    fn increase_loads_from_every_state() {
        for start in [RollStatus::None, RollStatus::Ready, RollStatus::Printing, RollStatus::Load] {
            let mut m = machine(10);
            m.status = start;
            assert_eq!(m.observe(Some(&accepted(500.0, 800.0))), RollStatus::Load, "{start}");
        }
    }

    #[test]
    fn printing_goes_idle_after_quiet_cycles() {
        let mut m = machine(3);
        m.observe(Some(&FilterOutcome::Baseline(r(800.0, 1))));
        m.observe(Some(&accepted(800.0, 799.0)));
        let steady = FilterOutcome::Steady(r(799.0, 2));
        assert_eq!(m.observe(Some(&steady)), RollStatus::Printing);
        assert_eq!(m.observe(Some(&steady)), RollStatus::Printing);
        // another drop restarts the idle count
        m.observe(Some(&accepted(799.0, 798.0)));
        assert_eq!(m.observe(None), RollStatus::Printing);
        assert_eq!(m.observe(Some(&steady)), RollStatus::Printing);
        assert_eq!(m.observe(Some(&steady)), RollStatus::Ready);
    }

    #[test]
    fn load_settles_on_steady_reading() {
        let mut m = machine(10);
        m.observe(Some(&FilterOutcome::Baseline(r(800.0, 1))));
        assert_eq!(m.on_event(StatusEvent::Recalibrated), RollStatus::Load);
        assert_eq!(m.observe(Some(&FilterOutcome::Baseline(r(0.0, 2)))), RollStatus::Load);
        assert_eq!(m.observe(Some(&FilterOutcome::Steady(r(0.0, 2)))), RollStatus::Ready);
    }

    #[test]
    fn restart_returns_to_none() {
        let mut m = machine(10);
        m.on_event(StatusEvent::RollTareChanged);
        assert_eq!(m.on_event(StatusEvent::Restart), RollStatus::None);
    }

    #[test]
    fn labels() {
        assert_eq!(RollStatus::Printing.label(), Some("Run"));
        assert_eq!(RollStatus::None.label(), None);
    }
}
