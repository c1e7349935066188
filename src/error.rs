//! Unified error types for the fluorologger firmware.
//!
//! Each collaborator behind a port trait reports its own small `Copy` enum.
//! The loop orchestrator is the final handler for all of them; it funnels
//! them into [`Error`] when emitting a fault event so the diagnostic channel
//! sees one uniform type.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible collaborator funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The ADC could not be read or returned an implausible value.
    Sensor(SensorError),
    /// The gain-select lines could not be driven.
    Actuator(ActuatorError),
    /// The real-time clock failed or returned an implausible time.
    Clock(ClockError),
    /// The append-only log store rejected a write.
    Storage(StorageError),
    /// The radio link rejected a telemetry frame.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction with the ADC failed.
    AdcReadFailed,
    /// The ADC never reported a finished conversion.
    ConversionTimeout,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::ConversionTimeout => write!(f, "ADC conversion timed out"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Clock errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    /// The RTC did not answer on the bus.
    Unavailable,
    /// The RTC oscillator stopped at some point; its time cannot be trusted.
    OscillatorStopped,
    /// Register contents do not form a valid calendar date-time.
    InvalidTime,
    /// The time is valid but outside the deployment window (e.g. unset RTC).
    Implausible,
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "RTC unavailable"),
            Self::OscillatorStopped => write!(f, "RTC oscillator stopped"),
            Self::InvalidTime => write!(f, "RTC returned an invalid date-time"),
            Self::Implausible => write!(f, "RTC time implausible"),
        }
    }
}

impl From<ClockError> for Error {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The volume holding the log is not mounted (card missing).
    NotMounted,
    /// The volume is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "log volume not mounted"),
            Self::Full => write!(f, "log volume full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The serial write failed outright.
    WriteFailed,
    /// Only part of the frame was accepted by the driver.
    Incomplete,
    /// The frame could not be encoded.
    Encoding,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "serial write failed"),
            Self::Incomplete => write!(f, "frame partially written"),
            Self::Encoding => write!(f, "frame encoding failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}
