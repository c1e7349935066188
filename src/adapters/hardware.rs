//! Hardware adapter: bridges the board's peripherals to domain port traits.
//!
//! Owns the ADC, RTC and gain-line drivers plus a delay provider and
//! exposes them through [`SensorPort`], [`ClockPort`], [`GainPort`] and
//! [`DelayNs`].  The ADC and RTC sit on the same I2C bus; the caller hands
//! in one bus handle per device (e.g. `embedded-hal-bus` `RefCellDevice`).

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::app::ports::{ClockPort, GainPort, SensorPort};
use crate::control::gain::GainLevel;
use crate::drivers::ads1115::Ads1115;
use crate::drivers::gain_lines::GainLines;
use crate::drivers::pcf8523::Pcf8523;
use crate::error::{ActuatorError, ClockError, SensorError};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<A, R, P, D> {
    adc: Ads1115<A>,
    rtc: Pcf8523<R>,
    gain: GainLines<P>,
    delay: D,
}

impl<A, R, P, D> HardwareAdapter<A, R, P, D>
where
    A: I2c,
    R: I2c,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(adc: Ads1115<A>, rtc: Pcf8523<R>, gain: GainLines<P>, delay: D) -> Self {
        Self {
            adc,
            rtc,
            gain,
            delay,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A: I2c, R, P, D: DelayNs> SensorPort for HardwareAdapter<A, R, P, D> {
    fn read_voltage(&mut self) -> Result<f64, SensorError> {
        self.adc.read_voltage(&mut self.delay)
    }
}

// ── ClockPort implementation ──────────────────────────────────

impl<A, R: I2c, P, D> ClockPort for HardwareAdapter<A, R, P, D> {
    fn now(&mut self) -> Result<NaiveDateTime, ClockError> {
        self.rtc.datetime()
    }
}

// ── GainPort implementation ───────────────────────────────────

impl<A, R, P: OutputPin, D> GainPort for HardwareAdapter<A, R, P, D> {
    fn assert_gain(&mut self, level: GainLevel) -> Result<(), ActuatorError> {
        self.gain.select(level)
    }
}

// ── Settle delay ──────────────────────────────────────────────

impl<A, R, P, D: DelayNs> DelayNs for HardwareAdapter<A, R, P, D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
