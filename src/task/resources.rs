//! # Resources
//! The peripherals of the clock, grouped by the part of the firmware that uses them, and the interrupt
//! bindings they need.
//!
//! | part    | pins                                                        |
//! |---------|-------------------------------------------------------------|
//! | buttons | Mode GP1, Hour+ GP2, Hour- GP3, Minute+ GP4, Minute- GP5    |
//! | buzzer  | GP6 (PWM slice 3, channel A)                                |
//! | display | I2C0, SDA GP12, SCL GP13                                    |
use embassy_rp::Peri;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::InterruptHandler as I2cInterruptHandler;
use embassy_rp::peripherals::{I2C0, PIN_12, PIN_13};

/// The OLED display
pub struct DisplayResources {
    /// I2C block the display hangs off
    pub i2c0: Peri<'static, I2C0>,
    /// I2C data
    pub sda: Peri<'static, PIN_12>,
    /// I2C clock
    pub scl: Peri<'static, PIN_13>,
}

// bind the interrupts, on a global scope
bind_interrupts!(pub struct Irqs {
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});
