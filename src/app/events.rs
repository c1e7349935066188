//! Outbound application events.
//!
//! The [`LoggerService`](super::service::LoggerService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial console, test recorder).

use crate::control::gain::GainLevel;
use crate::error::Error;
use crate::record::Record;

/// Structured events emitted by the logging loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has driven its initial gain and is about to loop.
    Started { gain: GainLevel },

    /// A record was produced this cycle (echoed to the console).
    Recorded(Record),

    /// The controller switched levels.
    GainChanged { from: GainLevel, to: GainLevel },

    /// A record went out over the radio.
    TelemetrySent,

    /// A subsystem failed; the cycle carried on without it.
    Fault(Error),

    /// Clean shutdown after a final flush.
    Stopped { cycles: u64 },
}
