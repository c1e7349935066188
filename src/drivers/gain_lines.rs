//! Three-line gain selector.
//!
//! One GPIO per gain level (1x, 10x, 100x) into the amplifier's switch
//! network.  Exactly one line is active at a time.  Switching is
//! break-before-make: the other lines are released first, then the target
//! line is driven, so two gains are never selected together.

use embedded_hal::digital::OutputPin;

use crate::control::gain::GainLevel;
use crate::error::ActuatorError;

pub struct GainLines<P> {
    /// Indexed by [`GainLevel::index`].
    lines: [P; 3],
    active_high: bool,
}

impl<P: OutputPin> GainLines<P> {
    /// `lines` in ladder order: 1x, 10x, 100x.
    pub fn new(lines: [P; 3], active_high: bool) -> Self {
        Self { lines, active_high }
    }

    /// Make `level`'s line the only active one.
    pub fn select(&mut self, level: GainLevel) -> Result<(), ActuatorError> {
        let target = usize::from(level.index());
        for (i, pin) in self.lines.iter_mut().enumerate() {
            if i != target {
                drive(pin, !self.active_high)?;
            }
        }
        drive(&mut self.lines[target], self.active_high)
    }
}

fn drive(pin: &mut impl OutputPin, high: bool) -> Result<(), ActuatorError> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|_| ActuatorError::GpioWriteFailed)
}
