//! # Time keeping
//! The RP2040 RTC as the time source of the clock. There is no network and no battery backup: after a
//! power cycle the RTC is stopped and the clock starts from the time the firmware was built. The same
//! build stamp is where a time reset goes.
//!
//! The RTC keeps a full date, so adjusting the time over midnight moves the date as well.
use defmt::{Debug2Format, info, warn};
use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc};
use pico_buzzer_alarmclock::config::BUILD_STAMP;
use pico_buzzer_alarmclock::interfaces::TimeSource;
use pico_buzzer_alarmclock::time::{CalendarDate, WallTime, shift_minutes};

/// The RTC, plus the last reading it gave
pub struct RtcClock {
    /// The hardware clock
    rtc: Rtc<'static, RTC>,
    /// The last good reading, returned if the RTC cannot be read
    last: (CalendarDate, WallTime),
}

impl RtcClock {
    /// Create a new `RtcClock`. Returns true as second value if the RTC was not running and had to be
    /// set to the build time.
    pub fn new(rtc: Rtc<'static, RTC>) -> (Self, bool) {
        let mut clock = Self {
            rtc,
            last: BUILD_STAMP,
        };
        let was_running = clock.rtc.is_running();
        if was_running {
            clock.read();
        } else {
            info!("RTC not running, setting it to the build time");
            clock.resync();
        }
        (clock, !was_running)
    }

    /// Read date and time, falling back to the last good reading
    fn read(&mut self) -> (CalendarDate, WallTime) {
        match self.rtc.now() {
            Ok(dt) => self.last = from_datetime(&dt),
            Err(e) => warn!("Failed to read the RTC: {:?}", Debug2Format(&e)),
        }
        self.last
    }

    /// Write date and time
    fn write(&mut self, date: CalendarDate, time: WallTime) {
        match self.rtc.set_datetime(to_datetime(date, time)) {
            Ok(()) => {
                self.last = (date, time);
                info!(
                    "RTC set to {}-{:02}-{:02} {:02}:{:02}:{:02}",
                    date.year, date.month, date.day, time.hour, time.minute, time.second
                );
            }
            Err(e) => warn!("Failed to set the RTC: {:?}", Debug2Format(&e)),
        }
    }
}

impl TimeSource for RtcClock {
    fn now(&mut self) -> WallTime {
        self.read().1
    }

    fn adjust(&mut self, time: WallTime) {
        let (date, _) = self.read();
        self.write(date, time);
    }

    fn adjust_by(&mut self, minutes: i32) {
        let (date, time) = self.read();
        let (date, time) = shift_minutes(date, time, minutes);
        self.write(date, time);
    }

    fn resync(&mut self) {
        let (date, time) = BUILD_STAMP;
        self.write(date, time);
    }
}

/// RTC reading to date and time
const fn from_datetime(dt: &DateTime) -> (CalendarDate, WallTime) {
    (
        CalendarDate {
            year: dt.year,
            month: dt.month,
            day: dt.day,
            weekday: dt.day_of_week as u8,
        },
        WallTime {
            hour: dt.hour,
            minute: dt.minute,
            second: dt.second,
        },
    )
}

/// Date and time to an RTC setting
const fn to_datetime(date: CalendarDate, time: WallTime) -> DateTime {
    DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        day_of_week: day_of_week(date.weekday),
        hour: time.hour,
        minute: time.minute,
        second: time.second,
    }
}

/// Sunday is 0
const fn day_of_week(weekday: u8) -> DayOfWeek {
    match weekday % 7 {
        0 => DayOfWeek::Sunday,
        1 => DayOfWeek::Monday,
        2 => DayOfWeek::Tuesday,
        3 => DayOfWeek::Wednesday,
        4 => DayOfWeek::Thursday,
        5 => DayOfWeek::Friday,
        _ => DayOfWeek::Saturday,
    }
}
