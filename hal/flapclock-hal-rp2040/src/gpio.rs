//! Coil and endstop pins

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;

/// One stepper driver input line (ULN2003 IN1..IN4)
pub struct Coil<'d>(Output<'d>);

impl<'d> Coil<'d> {
    /// Configure `pin` as a coil output, initially de-energized
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self(Output::new(pin, Level::Low))
    }
}

impl flapclock_hal::OutputPin for Coil<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Build the four coil lines of one axis
pub fn coils<'d>(
    in1: Peri<'d, impl Pin>,
    in2: Peri<'d, impl Pin>,
    in3: Peri<'d, impl Pin>,
    in4: Peri<'d, impl Pin>,
) -> [Coil<'d>; 4] {
    [Coil::new(in1), Coil::new(in2), Coil::new(in3), Coil::new(in4)]
}

/// Endstop switch input
///
/// Reports the raw level; polarity is applied by the axis controller.
pub struct Endstop<'d>(Input<'d>);

impl<'d> Endstop<'d> {
    /// Endstop switching to ground, with the internal pull-up enabled
    pub fn pulled_up(pin: Peri<'d, impl Pin>) -> Self {
        Self(Input::new(pin, Pull::Up))
    }

    /// Endstop driving the line high, with the internal pull-down enabled
    pub fn pulled_down(pin: Peri<'d, impl Pin>) -> Self {
        Self(Input::new(pin, Pull::Down))
    }

    /// Endstop for the configured polarity
    pub fn for_polarity(pin: Peri<'d, impl Pin>, active_low: bool) -> Self {
        if active_low {
            Self::pulled_up(pin)
        } else {
            Self::pulled_down(pin)
        }
    }
}

impl flapclock_hal::InputPin for Endstop<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
