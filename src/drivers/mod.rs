//! Peripheral drivers for the logger board.

pub mod ads1115;
pub mod gain_lines;
pub mod pcf8523;
pub mod watchdog;
