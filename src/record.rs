//! Samples and their canonical text record.
//!
//! One line per sample, shared verbatim by the card log and the radio:
//!
//! ```text
//! 2024-06-01 14:03:07,10,1.234
//! ```
//!
//! Timestamp as `YYYY-MM-DD HH:MM:SS`, gain as its multiplier, voltage
//! fixed-point with three decimals.  No trailing delimiter; the newline is
//! added by the log store.

use core::fmt::{self, Write as _};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::control::gain::GainLevel;
use crate::error::SensorError;

/// Rendered in place of a time when the clock has never produced one.
pub const UNAVAILABLE_TIMESTAMP: &str = "0000-00-00 00:00:00";

/// Header row written to a fresh log when enabled.
pub const CSV_HEADER: &str = "timestamp,gain,voltage";

/// Earliest and latest RTC years accepted as a real reading.
const PLAUSIBLE_YEARS: core::ops::RangeInclusive<i32> = 2020..=2099;

/// Longest line: 19 (timestamp) + 1 + 3 (gain) + 1 + voltage.  The sampler
/// only yields voltages bounded by ADC full scale times the divider factor,
/// which leaves ample room.
pub const RECORD_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// Time attached to a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    /// Fresh reading from the RTC.
    Rtc(NaiveDateTime),
    /// Last known-good reading, reused because the clock failed this cycle.
    Stale(NaiveDateTime),
    /// The clock has not produced a good reading since boot.
    Unavailable,
}

impl Timestamp {
    /// Whether an RTC reading lies inside the deployment window.
    pub fn is_plausible(t: &NaiveDateTime) -> bool {
        PLAUSIBLE_YEARS.contains(&t.year())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rtc(t) | Self::Stale(t) => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                t.year(),
                t.month(),
                t.day(),
                t.hour(),
                t.minute(),
                t.second()
            ),
            Self::Unavailable => f.write_str(UNAVAILABLE_TIMESTAMP),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// One acquisition: built once per cycle, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub gain: GainLevel,
    pub voltage: f64,
}

impl Sample {
    pub fn record(&self) -> Result<Record, SensorError> {
        Record::format(&self.timestamp, self.gain, self.voltage)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// Canonical text line for a [`Sample`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(heapless::String<RECORD_CAPACITY>);

impl Record {
    /// Render one line.  A voltage too wide for [`RECORD_CAPACITY`] is
    /// reported as out of range instead of yielding a truncated record.
    pub fn format(timestamp: &Timestamp, gain: GainLevel, voltage: f64) -> Result<Self, SensorError> {
        let mut line = heapless::String::new();
        write!(line, "{},{},{:.3}", timestamp, gain, voltage).map_err(|_| SensorError::OutOfRange)?;
        Ok(Self(line))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
