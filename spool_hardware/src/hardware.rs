//! Raspberry Pi backends: HX711 load cell, selector switches, buttons and sampling LED.

use std::time::Duration;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use spool_traits::{
    BoxError, ControlInput, ControlSignal, Indicator, Scale, SelectorInput, SelectorState,
};

use crate::error::{HwError, Result};
use crate::hx711::{Gain, Hx711};
use crate::util::EdgeDetector;

pub struct HardwareScale {
    hx711: Hx711,
    units_per_count: f32,
    ready_timeout: Duration,
}

impl HardwareScale {
    /// `units_per_count` converts HX711 counts into the raw weight units the core works in.
    /// `ready_timeout` caps the data-ready wait of a single conversion.
    pub fn try_new(
        dt_pin: u8,
        sck_pin: u8,
        units_per_count: f32,
        ready_timeout: Duration,
    ) -> Result<Self> {
        let gpio = Gpio::new()?;
        let dt = gpio.get(dt_pin)?.into_input();
        let sck = gpio.get(sck_pin)?.into_output_low();
        Ok(Self {
            hx711: Hx711::new(dt, sck, Gain::A128)?,
            units_per_count,
            ready_timeout,
        })
    }
}

impl Scale for HardwareScale {
    fn read(&mut self, timeout: Duration) -> std::result::Result<f32, BoxError> {
        let timeout = timeout.min(self.ready_timeout);
        let mut attempts = 0;
        let max_attempts = 3;
        loop {
            match self.hx711.read_with_timeout(timeout) {
                Ok(counts) => {
                    tracing::trace!(counts, "hx711 sample");
                    return Ok(counts as f32 * self.units_per_count);
                }
                Err(HwError::DataReadyTimeout) if attempts < max_attempts => {
                    attempts += 1;
                    tracing::warn!(retries = attempts, "scale timeout, retrying");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scale read error");
                    return Err(Box::new(e));
                }
            }
        }
    }
}

/// Three two-position switches; a high level selects position 1.
pub struct GpioSelector {
    material: InputPin,
    diameter: InputPin,
    roll: InputPin,
}

impl GpioSelector {
    pub fn try_new(material: u8, diameter: u8, roll: u8) -> Result<Self> {
        let gpio = Gpio::new()?;
        Ok(Self {
            material: gpio.get(material)?.into_input_pulldown(),
            diameter: gpio.get(diameter)?.into_input_pulldown(),
            roll: gpio.get(roll)?.into_input_pulldown(),
        })
    }
}

impl SelectorInput for GpioSelector {
    fn read_selector(&mut self) -> std::result::Result<SelectorState, BoxError> {
        Ok(SelectorState {
            material: u8::from(self.material.is_high()),
            diameter: u8::from(self.diameter.is_high()),
            roll: u8::from(self.roll.is_high()),
        })
    }
}

/// Restart and set-zero push buttons, sampled once per cycle.
///
/// Restart wins when both are pressed in the same cycle.
pub struct GpioControls {
    restart: InputPin,
    set_zero: InputPin,
    restart_edge: EdgeDetector,
    set_zero_edge: EdgeDetector,
}

impl GpioControls {
    pub fn try_new(restart: u8, set_zero: u8, active_low: bool) -> Result<Self> {
        let gpio = Gpio::new()?;
        let pin = |n: u8| -> Result<InputPin> {
            let p = gpio.get(n)?;
            Ok(if active_low {
                p.into_input_pullup()
            } else {
                p.into_input_pulldown()
            })
        };
        Ok(Self {
            restart: pin(restart)?,
            set_zero: pin(set_zero)?,
            restart_edge: EdgeDetector::new(active_low),
            set_zero_edge: EdgeDetector::new(active_low),
        })
    }
}

impl ControlInput for GpioControls {
    fn poll_event(&mut self) -> Option<ControlSignal> {
        let restart = self.restart_edge.feed(self.restart.is_high());
        let set_zero = self.set_zero_edge.feed(self.set_zero.is_high());
        if restart {
            Some(ControlSignal::Restart)
        } else if set_zero {
            Some(ControlSignal::SetZero)
        } else {
            None
        }
    }
}

pub struct GpioIndicator {
    led: OutputPin,
}

impl GpioIndicator {
    pub fn try_new(pin: u8) -> Result<Self> {
        let gpio = Gpio::new()?;
        Ok(Self {
            led: gpio.get(pin)?.into_output_low(),
        })
    }
}

impl Indicator for GpioIndicator {
    fn set_sampling(&mut self, on: bool) {
        if on {
            self.led.set_high();
        } else {
            self.led.set_low();
        }
    }
}
