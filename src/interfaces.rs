//! # Interfaces to the outside world
//! The state machine never touches hardware. It reads the time from a `TimeSource`, renders text to a
//! `DisplaySink` and beeps through a `ToneSink`. The firmware implements these over the RTC, the OLED
//! and a PWM driven buzzer, the unit tests over recording fakes.

use crate::time::WallTime;
use embassy_time::Duration;

/// Something that keeps the time of day
pub trait TimeSource {
    /// The current time of day
    fn now(&mut self) -> WallTime;

    /// Set the time of day, leaving the date alone
    fn adjust(&mut self, time: WallTime);

    /// Move the clock by a signed number of minutes, wrapping over midnight (and the date, if kept)
    fn adjust_by(&mut self, minutes: i32);

    /// Set the clock back to its reference time, the time this firmware was built
    fn resync(&mut self);
}

/// A character display, 16 columns by 2 rows
pub trait DisplaySink {
    /// Move the cursor, the next `print` starts here
    fn set_cursor(&mut self, col: u8, row: u8);

    /// Print text at the cursor, the cursor advances
    fn print(&mut self, text: &str);

    /// Blank the whole display
    fn clear(&mut self);
}

/// A buzzer that plays square wave tones
pub trait ToneSink {
    /// Play a tone, a new tone replaces the one currently playing
    fn tone(&mut self, frequency_hz: u32, duration: Duration);

    /// Stop playing
    fn silence(&mut self);
}

/// A tone to be played
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct Tone {
    /// Frequency in Hz
    pub frequency_hz: u32,
    /// How long the tone plays
    pub duration: Duration,
}

impl Tone {
    /// Short acknowledgment beep for mode changes
    pub const ACK: Self = Self {
        frequency_hz: 500,
        duration: Duration::from_millis(100),
    };

    /// Confirmation of a time reset
    pub const RESET: Self = Self {
        frequency_hz: 800,
        duration: Duration::from_millis(200),
    };

    /// The alarm tone, the pitch wanders between 1000Hz and 1199Hz with the uptime
    pub const fn alarm(uptime_ms: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let wobble = (uptime_ms % 200) as u32;
        Self {
            frequency_hz: 1000 + wobble,
            duration: Duration::from_millis(500),
        }
    }

    /// Play this tone on a sink
    pub fn play(self, sink: &mut impl ToneSink) {
        sink.tone(self.frequency_hz, self.duration);
    }
}
