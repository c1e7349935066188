//! Averaging sampler.
//!
//! Takes `samples` raw readings from the analog channel, waits the settle
//! delay between consecutive readings, and returns the divider-corrected
//! mean.  Holds only its parameters; nothing carries over between calls.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::app::ports::SensorPort;
use crate::config::LoggerConfig;
use crate::drivers::ads1115::FULL_SCALE_V;
use crate::error::SensorError;

#[derive(Debug, Clone, Copy)]
pub struct AveragingSampler {
    samples: u8,
    settle: Duration,
    divider_factor: f64,
}

impl AveragingSampler {
    /// `samples >= 1`, `divider_factor > 0` (checked by config validation).
    pub fn new(samples: u8, settle: Duration, divider_factor: f64) -> Self {
        debug_assert!(samples >= 1);
        debug_assert!(divider_factor > 0.0);
        Self {
            samples: samples.max(1),
            settle,
            divider_factor,
        }
    }

    pub fn from_config(config: &LoggerConfig) -> Self {
        Self::new(
            config.averaging_samples,
            config.averaging_delay(),
            config.divider_factor,
        )
    }

    /// Read and average.  The first failing read aborts the whole sample.
    /// A mean beyond ADC full scale times the divider cannot come from the
    /// front end and is rejected as out of range.
    ///
    /// `adc` also provides the settle delay; on the board both live behind
    /// the same hardware adapter, which avoids a double mutable borrow.
    pub fn sample(&self, adc: &mut (impl SensorPort + DelayNs)) -> Result<f64, SensorError> {
        let settle_us = u32::try_from(self.settle.as_micros()).unwrap_or(u32::MAX);
        let mut total = 0.0_f64;

        for i in 0..self.samples {
            if i > 0 && settle_us > 0 {
                adc.delay_us(settle_us);
            }
            total += adc.read_voltage()?;
        }

        let mean = total / f64::from(self.samples) * self.divider_factor;
        if mean.is_finite() && mean.abs() <= FULL_SCALE_V * self.divider_factor {
            Ok(mean)
        } else {
            Err(SensorError::OutOfRange)
        }
    }
}
