//! Tasks that make up the firmware as well as the hardware they use.
pub mod buttons;
pub mod display;
pub mod orchestrate;
pub mod resources;
pub mod sound;
pub mod time_updater;
pub mod watchdog;
