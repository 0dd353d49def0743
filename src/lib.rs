//! # Pico buzzer alarm clock
//! The clock itself: state, button handling, the alarm trigger and the tick loop that ties them together.
//! None of this touches hardware, the firmware in `main.rs` plugs the RTC, the OLED and the buzzer in
//! through the traits in `interfaces`. That keeps everything in here testable on the host.
#![cfg_attr(not(test), no_std)]

pub mod alarm_trigger;
pub mod buttons;
pub mod config;
pub mod event;
pub mod interfaces;
pub mod orchestrate;
pub mod state;
pub mod time;
pub mod utility;
