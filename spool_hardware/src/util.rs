use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until the provided `is_high` predicate becomes false (i.e., line goes low),
/// or a timeout expires. Sleeps in small intervals to avoid CPU spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Rising-edge detector over a sampled logic level.
///
/// `active_low` inverts the input so "pressed" is always `true`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDetector {
    active_low: bool,
    last: bool,
}

impl EdgeDetector {
    pub fn new(active_low: bool) -> Self {
        Self {
            active_low,
            last: false,
        }
    }

    /// Feed the raw level; true exactly once per press.
    pub fn feed(&mut self, level_high: bool) -> bool {
        let pressed = level_high != self.active_low;
        let edge = pressed && !self.last;
        self.last = pressed;
        edge
    }
}

#[cfg(test)]
mod tests {
    use super::EdgeDetector;

    #[test]
    fn active_low_press_fires_once() {
        let mut e = EdgeDetector::new(true);
        assert!(!e.feed(true));
        assert!(e.feed(false));
        assert!(!e.feed(false));
        assert!(!e.feed(true));
        assert!(e.feed(false));
    }

    #[test]
    fn active_high_press() {
        let mut e = EdgeDetector::new(false);
        assert!(!e.feed(false));
        assert!(e.feed(true));
        assert!(!e.feed(true));
    }
}
