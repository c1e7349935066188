//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the `log`
//! facade (UART / USB-CDC on the device).  Every record is echoed so the
//! serial monitor shows the same lines the card receives.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Recorded(record) => info!("{}", record),
            AppEvent::GainChanged { from, to } => info!("GAIN  | {}x -> {}x", from, to),
            AppEvent::TelemetrySent => info!("RADIO | sent"),
            AppEvent::Fault(e) => warn!("FAULT | {}", e),
            AppEvent::Started { gain } => info!("START | gain={}x", gain),
            AppEvent::Stopped { cycles } => info!("STOP  | after {} cycles", cycles),
        }
    }
}
