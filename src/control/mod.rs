//! Closed-loop control of the sensor front-end.

pub mod gain;
