//! # Button pins
//! The five buttons are plain inputs with pull ups, pressed pulls the pin to ground. They are not
//! watched by tasks of their own: the clock task samples all of them once per tick.
use embassy_rp::gpio::{Input, Level as PinLevel};
use pico_buzzer_alarmclock::buttons::{ButtonLevels, Level};

/// The inputs of all buttons, in the order of `Button::ALL`
pub struct ButtonPins {
    /// Mode, hour up, hour down, minute up, minute down
    inputs: [Input<'static>; 5],
}

impl ButtonPins {
    /// Create a new `ButtonPins`, the inputs must be configured with pull ups
    pub const fn new(inputs: [Input<'static>; 5]) -> Self {
        Self { inputs }
    }

    /// Sample all pins
    pub fn read(&self) -> ButtonLevels {
        ButtonLevels::new(self.inputs.each_ref().map(|input| match input.get_level() {
            PinLevel::Low => Level::Low,
            PinLevel::High => Level::High,
        }))
    }
}
