//! Serial radio link adapter.
//!
//! Implements [`TransportPort`] over any byte sink (`std::io::Write`): the
//! UART to the LoRa mesh node on the device, a `Vec<u8>` in tests.  Frames
//! are fire-and-forget; nothing is read back.
//!
//! | Framing          | Bytes on the wire                   |
//! |------------------|-------------------------------------|
//! | `Raw`            | `<record>`                          |
//! | `MeshtasticJson` | `!M{"text":"<record>"}\n`           |

use std::io::{self, Write};

use log::debug;
use serde::Serialize;

use crate::app::ports::TransportPort;
use crate::config::TelemetryFraming;
use crate::error::TransportError;

const MESHTASTIC_PREFIX: &[u8] = b"!M";

#[derive(Serialize)]
struct TextMessage<'a> {
    text: &'a str,
}

pub struct RadioLink<W> {
    port: W,
    framing: TelemetryFraming,
}

impl<W: Write> RadioLink<W> {
    pub fn new(port: W, framing: TelemetryFraming) -> Self {
        Self { port, framing }
    }

    pub fn framing(&self) -> TelemetryFraming {
        self.framing
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}

/// Build the wire frame for `payload` under `framing`.
pub fn frame(payload: &[u8], framing: TelemetryFraming) -> Result<Vec<u8>, TransportError> {
    match framing {
        TelemetryFraming::Raw => Ok(payload.to_vec()),
        TelemetryFraming::MeshtasticJson => {
            let text = core::str::from_utf8(payload).map_err(|_| TransportError::Encoding)?;
            let json = serde_json::to_vec(&TextMessage { text })
                .map_err(|_| TransportError::Encoding)?;
            let mut out = Vec::with_capacity(MESHTASTIC_PREFIX.len() + json.len() + 1);
            out.extend_from_slice(MESHTASTIC_PREFIX);
            out.extend_from_slice(&json);
            out.push(b'\n');
            Ok(out)
        }
    }
}

impl<W: Write> TransportPort for RadioLink<W> {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let frame = frame(payload, self.framing)?;
        self.port.write_all(&frame).map_err(|e| match e.kind() {
            io::ErrorKind::WriteZero => TransportError::Incomplete,
            _ => TransportError::WriteFailed,
        })?;
        self.port.flush().map_err(|_| TransportError::WriteFailed)?;
        debug!("Radio: {} bytes out", frame.len());
        Ok(())
    }
}

// ── ESP-IDF UART sink ─────────────────────────────────────────

/// `std::io::Write` over the ESP-IDF UART driver.
#[cfg(feature = "espidf")]
pub struct UartWriter<'d> {
    uart: esp_idf_hal::uart::UartDriver<'d>,
}

#[cfg(feature = "espidf")]
impl<'d> UartWriter<'d> {
    pub fn new(uart: esp_idf_hal::uart::UartDriver<'d>) -> Self {
        Self { uart }
    }
}

#[cfg(feature = "espidf")]
impl Write for UartWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.uart
            .write(buf)
            .map_err(|e| io::Error::other(format!("uart: {e}")))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.uart
            .wait_tx_done(esp_idf_hal::delay::BLOCK)
            .map_err(|e| io::Error::other(format!("uart: {e}")))
    }
}
