//! Fluorologger firmware library.
//!
//! Exposes the logging loop and its adapters for the device binary and for
//! integration testing on a workstation.  All ESP-IDF-specific code is
//! guarded by `#[cfg(feature = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod record;
pub mod scheduler;

pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
