//! Fuzz target: telemetry framing
//!
//! Frames arbitrary payloads in both wire formats.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Raw frames are the payload verbatim
//! - Meshtastic frames are `!M` + one JSON object + `\n`, with the payload
//!   recoverable from the `text` field
//!
//! cargo fuzz run fuzz_telemetry_frame

#![no_main]

use fluorologger::adapters::radio::frame;
use fluorologger::config::TelemetryFraming;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = frame(data, TelemetryFraming::Raw).expect("raw framing never fails");
    assert_eq!(raw, data);

    let Ok(mesh) = frame(data, TelemetryFraming::MeshtasticJson) else {
        assert!(core::str::from_utf8(data).is_err(), "valid UTF-8 must frame");
        return;
    };
    assert!(mesh.starts_with(b"!M"));
    assert_eq!(mesh.last(), Some(&b'\n'));

    let body: serde_json::Value =
        serde_json::from_slice(&mesh[2..mesh.len() - 1]).expect("frame body must be JSON");
    assert_eq!(body["text"].as_str().map(str::as_bytes), Some(data));
});
