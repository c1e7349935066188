//! Port traits: the hexagonal boundary between the logging loop and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LoggerService (domain)
//! ```
//!
//! Driven adapters (ADC, gain lines, RTC, log store, radio, timer, event
//! sinks) implement these traits.  The
//! [`LoggerService`](super::service::LoggerService) consumes them via
//! generics, so the control loop never touches hardware directly.
//!
//! All port errors are typed; the orchestrator handles every variant.

use core::time::Duration;

use chrono::NaiveDateTime;

use crate::config::LoggerConfig;
use crate::control::gain::GainLevel;
use crate::error::{ActuatorError, ClockError, SensorError, StorageError, TransportError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: ADC → domain)
// ───────────────────────────────────────────────────────────────

/// One raw voltage reading on demand from the analog channel.
pub trait SensorPort {
    fn read_voltage(&mut self) -> Result<f64, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Gain port (driven adapter: domain → gain-select lines)
// ───────────────────────────────────────────────────────────────

/// Drives the three mutually exclusive gain-select lines.
pub trait GainPort {
    /// Make `level`'s line the only active one.
    fn assert_gain(&mut self, level: GainLevel) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: RTC → domain)
// ───────────────────────────────────────────────────────────────

/// Calendar time for record timestamps.
pub trait ClockPort {
    fn now(&mut self) -> Result<NaiveDateTime, ClockError>;
}

// ───────────────────────────────────────────────────────────────
// Log store port (driven adapter: domain → append-only file)
// ───────────────────────────────────────────────────────────────

/// Durable, append-only line storage.
///
/// `append` must either persist the whole line (plus newline) or fail; it
/// must never truncate or rewrite earlier lines.  Implementations release
/// any handle they open before returning, on success and on failure.
pub trait LogStorePort {
    fn append(&mut self, line: &str) -> Result<(), StorageError>;

    /// Push anything still buffered to the medium (clean shutdown).
    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → radio link)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget telemetry link.  No acknowledgement, no retry.
pub trait TransportPort {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Timer port (driven adapter: monotonic clock + low-power wait)
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot and the lowest-power wait the platform has.
pub trait TimerPort {
    /// Monotonic time since boot.
    fn now(&self) -> Duration;

    /// Block until `deadline` (monotonic).  May return early on a foreign
    /// wake source; callers re-check [`now`](Self::now).
    fn sleep_until(&mut self, deadline: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists the logger configuration.
///
/// Implementations MUST validate before persisting and after loading.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] when nothing
    /// is stored yet.
    fn load(&self) -> Result<LoggerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &LoggerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
