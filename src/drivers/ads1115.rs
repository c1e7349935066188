//! ADS1115 16-bit ADC driver (I2C).
//!
//! Single-shot conversions on AIN0 against GND at ±4.096 V full scale and
//! 128 SPS.  Each read starts a conversion, waits for it, polls the
//! conversion-ready flag and scales the signed result to volts.
//!
//! Generic over [`embedded_hal::i2c::I2c`], so the same code runs on the
//! ESP-IDF bus driver and on a host mock.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

use crate::error::SensorError;

pub const DEFAULT_ADDRESS: u8 = 0x48;

const REG_CONVERSION: u8 = 0x00;
const REG_CONFIG: u8 = 0x01;

/// OS=start | MUX=AIN0/GND | PGA=±4.096 V | MODE=single | DR=128 SPS | comparator off.
const CONFIG_SINGLE_SHOT_AIN0: u16 = 0xC383;
/// Config register bit 15 reads back 1 once the conversion finished.
const OS_READY: u16 = 0x8000;

pub const FULL_SCALE_V: f64 = 4.096;
/// One conversion at 128 SPS is 7.8 ms.
const CONVERSION_WAIT_US: u32 = 8_000;
const POLL_INTERVAL_US: u32 = 500;
const POLL_LIMIT: u8 = 20;

pub struct Ads1115<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ads1115<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// One single-shot conversion on AIN0, in volts at the ADC pin.
    pub fn read_voltage(&mut self, delay: &mut impl DelayNs) -> Result<f64, SensorError> {
        let [hi, lo] = CONFIG_SINGLE_SHOT_AIN0.to_be_bytes();
        self.i2c
            .write(self.address, &[REG_CONFIG, hi, lo])
            .map_err(|_| SensorError::AdcReadFailed)?;

        delay.delay_us(CONVERSION_WAIT_US);
        self.wait_ready(delay)?;

        let raw = i16::from_be_bytes(self.read_register(REG_CONVERSION)?.to_be_bytes());
        Ok(raw_to_volts(raw))
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn wait_ready(&mut self, delay: &mut impl DelayNs) -> Result<(), SensorError> {
        for attempt in 0..POLL_LIMIT {
            if self.read_register(REG_CONFIG)? & OS_READY != 0 {
                if attempt > 0 {
                    debug!("ADS1115 ready after {} extra polls", attempt);
                }
                return Ok(());
            }
            delay.delay_us(POLL_INTERVAL_US);
        }
        Err(SensorError::ConversionTimeout)
    }

    fn read_register(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(|_| SensorError::AdcReadFailed)?;
        Ok(u16::from_be_bytes(buf))
    }
}

/// Scale a signed conversion result at ±4.096 V full scale.
pub fn raw_to_volts(raw: i16) -> f64 {
    f64::from(raw) * FULL_SCALE_V / 32_768.0
}
