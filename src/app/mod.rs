//! Application core: pure domain logic with no I/O.
//!
//! The logging loop (sample, persist, transmit, adjust gain) lives in
//! [`service`].  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod events;
pub mod ports;
pub mod service;
