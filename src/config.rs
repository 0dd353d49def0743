//! # Clock configuration
//! The tunables of the clock are read from `config/clock_config.json` at build time, see `build.rs`.
//! The build script also stamps the build time, which is where the clock goes on a time reset.
//!
//! make sure to have a `clock_config.json` file in the config folder formatted as follows:
//! ```json
//! {
//!     "tick_interval_ms": 50,
//!     "long_press_ms": 1000,
//!     "edit_inactivity_timeout_ms": 5000,
//!     "adjust_repeat_delay_ms": 200,
//!     "adjust_repeat_interval_ms": 200,
//!     "reset_confirmation_ms": 1000,
//!     "default_alarm": { "hour": 12, "minute": 0 },
//!     "utc_offset_minutes": 0
//! }
//! ```

include!(concat!(env!("OUT_DIR"), "/clock_config.rs"));
include!(concat!(env!("OUT_DIR"), "/build_stamp.rs"));

use crate::time::{CalendarDate, WallTime};
use embassy_time::Duration;

/// The local date and time this firmware was built, the target of a time reset
pub const BUILD_STAMP: (CalendarDate, WallTime) = (
    CalendarDate {
        year: BUILD_YEAR,
        month: BUILD_MONTH,
        day: BUILD_DAY,
        weekday: BUILD_WEEKDAY,
    },
    WallTime {
        hour: BUILD_HOUR,
        minute: BUILD_MINUTE,
        second: BUILD_SECOND,
    },
);

/// Timing and defaults of the clock
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    /// Polling period of the tick loop. Buttons are only debounced by this cadence, so it must not be
    /// shorter than the bounce time of the switches (50ms).
    pub tick_interval: Duration,
    /// A mode button press at least this long is a long press
    pub long_press: Duration,
    /// Edit mode falls back to normal mode after this long without an alarm edit
    pub edit_timeout: Duration,
    /// Hold time before an adjust button starts repeating
    pub repeat_delay: Duration,
    /// Time between repeats of a held adjust button
    pub repeat_interval: Duration,
    /// How long the time reset confirmation is shown before the display is cleared
    pub reset_confirmation: Duration,
    /// The alarm time after power up, (hour, minute)
    pub default_alarm: (u8, u8),
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            long_press: Duration::from_millis(LONG_PRESS_MS),
            edit_timeout: Duration::from_millis(EDIT_INACTIVITY_TIMEOUT_MS),
            repeat_delay: Duration::from_millis(ADJUST_REPEAT_DELAY_MS),
            repeat_interval: Duration::from_millis(ADJUST_REPEAT_INTERVAL_MS),
            reset_confirmation: Duration::from_millis(RESET_CONFIRMATION_MS),
            default_alarm: (DEFAULT_ALARM_HOUR, DEFAULT_ALARM_MINUTE),
        }
    }
}
