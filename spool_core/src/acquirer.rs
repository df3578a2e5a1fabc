//! Sample acquisition: one burst of raw reads per cycle, reduced by arithmetic mean.

use std::time::Duration;

use spool_traits::{Indicator, Scale};

use crate::error::MonitorError;
use crate::hw_error::map_hw_error;

/// Arithmetic mean of a burst, accumulated in f64. `None` for an empty slice.
pub fn reduce(samples: &[f32]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|&v| f64::from(v)).sum();
    Some((sum / samples.len() as f64) as f32)
}

#[derive(Debug)]
pub struct Acquirer {
    samples: usize,
    timeout: Duration,
    buf: Vec<f32>,
}

impl Acquirer {
    /// Fails with `MonitorError::Config` when `samples` is zero or negative.
    pub fn new(samples: i32, timeout: Duration) -> Result<Self, MonitorError> {
        if samples <= 0 {
            return Err(MonitorError::Config(format!(
                "sample count must be >= 1, got {samples}"
            )));
        }
        let samples = samples as usize;
        Ok(Self {
            samples,
            timeout,
            buf: Vec::with_capacity(samples),
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Take one burst with the sampling indicator lit for its duration.
    ///
    /// The indicator is switched off again even when a read fails.
    pub fn acquire<S, I>(&mut self, scale: &mut S, indicator: &mut I) -> Result<f32, MonitorError>
    where
        S: Scale + ?Sized,
        I: Indicator + ?Sized,
    {
        indicator.set_sampling(true);
        let res = self.read_burst(scale);
        indicator.set_sampling(false);
        res
    }

    fn read_burst<S: Scale + ?Sized>(&mut self, scale: &mut S) -> Result<f32, MonitorError> {
        self.buf.clear();
        for i in 0..self.samples {
            let raw = scale
                .read(self.timeout)
                .map_err(|e| map_hw_error(&*e))?;
            if !raw.is_finite() {
                return Err(MonitorError::Hardware(format!(
                    "non-finite sample {i} in burst"
                )));
            }
            tracing::trace!(sample = i, raw, "raw sample");
            self.buf.push(raw);
        }
        // samples >= 1, so the burst is never empty
        reduce(&self.buf).ok_or_else(|| MonitorError::Hardware("empty burst".into()))
    }
}
