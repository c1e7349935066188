//! Sensor acquisition.
//!
//! The fluorometer has a single analog output; [`sampler`] turns a burst
//! of raw ADC readings into one noise-averaged voltage per cycle.

pub mod sampler;
