//! Adaptive gain controller for the fluorometer amplifier.
//!
//! Three discrete levels, hysteretic switching, at most one step per call.
//! The dead band between the two thresholds is where the controller rests;
//! a reading far outside it still only moves one level per cycle.

use core::fmt;

use log::info;

use crate::app::ports::GainPort;
use crate::error::ActuatorError;

/// Discrete amplification of the sensor output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GainLevel {
    X1,
    X10,
    X100,
}

impl GainLevel {
    pub const ALL: [GainLevel; 3] = [GainLevel::X1, GainLevel::X10, GainLevel::X100];

    /// Numeric multiplier as rendered in records.
    pub const fn multiplier(self) -> u8 {
        match self {
            Self::X1 => 1,
            Self::X10 => 10,
            Self::X100 => 100,
        }
    }

    pub const fn step_up(self) -> Option<Self> {
        match self {
            Self::X1 => Some(Self::X10),
            Self::X10 => Some(Self::X100),
            Self::X100 => None,
        }
    }

    pub const fn step_down(self) -> Option<Self> {
        match self {
            Self::X1 => None,
            Self::X10 => Some(Self::X1),
            Self::X100 => Some(Self::X10),
        }
    }

    /// Position in the ladder (0, 1, 2).
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for GainLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.multiplier())
    }
}

/// Gain controller
pub struct GainController {
    current: GainLevel,
    up_threshold_v: f64,
    down_threshold_v: f64,
}

impl GainController {
    /// Start at 1x.  `up_threshold_v` must be below `down_threshold_v`.
    pub fn new(up_threshold_v: f64, down_threshold_v: f64) -> Self {
        debug_assert!(up_threshold_v < down_threshold_v);
        Self {
            current: GainLevel::X1,
            up_threshold_v,
            down_threshold_v,
        }
    }

    pub fn current(&self) -> GainLevel {
        self.current
    }

    /// Level to apply next, or `None` if the reading is acceptable.
    ///
    /// Too bright steps down before too dark is considered, matching the
    /// priority of the thresholds when they are evaluated in order.
    pub fn evaluate(&self, voltage: f64) -> Option<GainLevel> {
        if voltage > self.down_threshold_v {
            self.current.step_down()
        } else if voltage < self.up_threshold_v {
            self.current.step_up()
        } else {
            None
        }
    }

    /// Drive the lines for `level` and adopt it as the current gain.
    ///
    /// On a line failure the tracked level is left unchanged.
    pub fn apply(&mut self, level: GainLevel, lines: &mut impl GainPort) -> Result<(), ActuatorError> {
        lines.assert_gain(level)?;
        if level != self.current {
            info!("Gain: {}x -> {}x", self.current, level);
        }
        self.current = level;
        Ok(())
    }

    /// Re-drive the lines for the current level (after a wake).
    pub fn reassert(&self, lines: &mut impl GainPort) -> Result<(), ActuatorError> {
        lines.assert_gain(self.current)
    }
}
