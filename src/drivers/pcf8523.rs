//! PCF8523 real-time clock driver (I2C).
//!
//! Reads the seven BCD time registers in one burst starting at `Seconds`.
//! The oscillator-stop flag (bit 7 of `Seconds`) means the backup supply
//! lapsed and the time is meaningless, so it is reported as a failure.
//! Assumes the chip runs in 24-hour mode (power-on default).

use chrono::{NaiveDate, NaiveDateTime};
use embedded_hal::i2c::I2c;

use crate::error::ClockError;

pub const ADDRESS: u8 = 0x68;

const REG_SECONDS: u8 = 0x03;
const OS_FLAG: u8 = 0x80;

pub struct Pcf8523<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Pcf8523<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn datetime(&mut self) -> Result<NaiveDateTime, ClockError> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(ADDRESS, &[REG_SECONDS], &mut regs)
            .map_err(|_| ClockError::Unavailable)?;
        decode(&regs)
    }
}

/// Registers 0x03..=0x09: seconds, minutes, hours, days, weekdays, months, years.
fn decode(regs: &[u8; 7]) -> Result<NaiveDateTime, ClockError> {
    if regs[0] & OS_FLAG != 0 {
        return Err(ClockError::OscillatorStopped);
    }
    let second = u32::from(bcd(regs[0] & 0x7F)?);
    let minute = u32::from(bcd(regs[1] & 0x7F)?);
    let hour = u32::from(bcd(regs[2] & 0x3F)?);
    let day = u32::from(bcd(regs[3] & 0x3F)?);
    let month = u32::from(bcd(regs[5] & 0x1F)?);
    let year = 2000 + i32::from(bcd(regs[6])?);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or(ClockError::InvalidTime)
}

fn bcd(v: u8) -> Result<u8, ClockError> {
    let (tens, units) = (v >> 4, v & 0x0F);
    if tens > 9 || units > 9 {
        return Err(ClockError::InvalidTime);
    }
    Ok(tens * 10 + units)
}
