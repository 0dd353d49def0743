//! Firmware of the alarm clock for the Raspberry Pi Pico.
//!
//! Sets up the hardware and spawns two tasks: the clock, which runs the tick loop, and the watchdog,
//! which resets the chip if the clock stops ticking.
// we are in an environment with constrained resources, so we do not use the standard library and we define a different entry point.
#![cfg_attr(target_os = "none", no_std, no_main)]

#[cfg(target_os = "none")]
mod task;

#[cfg(target_os = "none")]
use {defmt_rtt as _, panic_probe as _}; // global logger and panic handler

// Entry point
#[cfg(target_os = "none")]
#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) {
    use defmt::{info, unwrap};
    use embassy_rp::gpio::{Input, Pull};
    use embassy_rp::rtc::Rtc;
    use pico_buzzer_alarmclock::config::ClockConfig;
    use task::{
        buttons::ButtonPins, orchestrate::clock, resources::DisplayResources, sound::PwmBuzzer,
        watchdog::watchdog_task,
    };

    info!("Program start");

    // Initialize the peripherals for the RP2040
    let p = embassy_rp::init(Default::default());

    // the watchdog goes first, so a hang during the rest of the setup resets the chip
    unwrap!(spawner.spawn(watchdog_task(p.WATCHDOG)));

    info!("init buttons");
    let buttons = ButtonPins::new([
        Input::new(p.PIN_1, Pull::Up),
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
    ]);

    info!("init rtc");
    let rtc = Rtc::new(p.RTC);

    info!("init buzzer");
    let buzzer = PwmBuzzer::new(p.PWM_SLICE3, p.PIN_6);

    let display = DisplayResources {
        i2c0: p.I2C0,
        sda: p.PIN_12,
        scl: p.PIN_13,
    };

    unwrap!(spawner.spawn(clock(
        ClockConfig::default(),
        buttons,
        rtc,
        buzzer,
        display
    )));
}

/// The firmware only runs on the RP2040. On the host the clock is exercised by `cargo test`.
#[cfg(not(target_os = "none"))]
fn main() {}
