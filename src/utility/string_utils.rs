//! # StringUtils
//! This module contains utility functions around string handling that are used in the project:
//! the text lines shown on the 16x2 character display.

use crate::state::AlarmSettings;
use crate::time::WallTime;
use core::fmt::Write;
use heapless::String;

/// Width of a display row in characters
pub const ROW_WIDTH: usize = 16;

/// One full display row
pub type Row = String<ROW_WIDTH>;

/// Text utilities, grouped like the rest of the project's helpers
pub struct StringUtils;

impl StringUtils {
    /// The time line of normal mode, `"Time: 07:05:09  "`
    pub fn time_row(time: &WallTime) -> Row {
        let mut s: Row = String::new();
        let _ = write!(
            s,
            "Time: {:02}:{:02}:{:02}",
            time.hour, time.minute, time.second
        );
        Self::pad_row(s)
    }

    /// The alarm line of edit mode, `"Alarm: 07:30    "`
    pub fn alarm_row(alarm: &AlarmSettings) -> Row {
        let mut s: Row = String::new();
        let _ = write!(s, "Alarm: {:02}:{:02}", alarm.get_hour(), alarm.get_minute());
        Self::pad_row(s)
    }

    /// A fixed message padded to the full row, so it overwrites whatever was there before
    pub fn message_row(message: &str) -> Row {
        let mut s: Row = String::new();
        for c in message.chars().take(ROW_WIDTH) {
            let _ = s.push(c);
        }
        Self::pad_row(s)
    }

    /// Fill the row up with spaces to the display width
    fn pad_row(mut s: Row) -> Row {
        while s.len() < ROW_WIDTH {
            if s.push(' ').is_err() {
                break;
            }
        }
        s
    }
}
