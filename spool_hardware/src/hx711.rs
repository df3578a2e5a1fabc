use std::time::Duration;
use tracing::trace;

use crate::error::Result;
use crate::util::wait_until_low_with_timeout;

/// Gain/channel selection, encoded as the number of trailing SCK pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    A128 = 25,
    B32 = 26,
    A64 = 27,
}

pub struct Hx711 {
    dt: rppal::gpio::InputPin,
    sck: rppal::gpio::OutputPin,
    gain: Gain,
}

impl Hx711 {
    pub fn new(
        dt_pin: rppal::gpio::InputPin,
        mut sck_pin: rppal::gpio::OutputPin,
        gain: Gain,
    ) -> Result<Self> {
        sck_pin.set_low(); // clock idle low
        Ok(Self {
            dt: dt_pin,
            sck: sck_pin,
            gain,
        })
    }

    /// One signed 24-bit conversion, waiting at most `timeout` for data ready.
    pub fn read_with_timeout(&mut self, timeout: Duration) -> Result<i32> {
        let dt = &self.dt;
        wait_until_low_with_timeout(|| dt.is_high(), timeout, Duration::from_micros(200))?;

        // Clock out 24 bits, MSB first
        let mut value: i32 = 0;
        for _ in 0..24 {
            self.sck.set_high();
            spin_delay();
            value = (value << 1) | i32::from(self.dt.is_high());
            self.sck.set_low();
            spin_delay();
        }

        // Extra pulses select gain for the next conversion
        for _ in 24..(self.gain as u8) {
            self.sck.set_high();
            spin_delay();
            self.sck.set_low();
            spin_delay();
        }

        // Sign extend 24-bit
        if (value & 0x80_0000) != 0 {
            value |= !0xFF_FFFF;
        }
        trace!(raw = value, "hx711 raw read");
        Ok(value)
    }
}

#[inline(always)]
fn spin_delay() {
    // SCK high time must stay under 50 us or the chip powers down.
    std::hint::spin_loop();
}
