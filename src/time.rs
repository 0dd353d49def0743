//! # Time of day and calendar arithmetic
//! The clock reads a `WallTime` from the time source every tick. The calendar part is only needed by
//! time sources that also keep a date, the RP2040 RTC being one, when minutes are added or taken away
//! across midnight.

/// Minutes in a day
const MINUTES_PER_DAY: i32 = 24 * 60;

/// A snapshot of the time of day, as delivered by the time source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct WallTime {
    /// 0..24
    pub hour: u8,
    /// 0..60
    pub minute: u8,
    /// 0..60
    pub second: u8,
}

impl WallTime {
    /// Create a new `WallTime`. Out of range values are wrapped into range.
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
            second: second % 60,
        }
    }

    /// Minutes since midnight
    pub const fn minutes_of_day(&self) -> i32 {
        self.hour as i32 * 60 + self.minute as i32
    }

    /// Shift the time by a signed number of minutes, seconds stay untouched.
    /// Returns the new time and the number of days we moved over midnight (negative when going back).
    pub const fn add_minutes(self, minutes: i32) -> (Self, i32) {
        let total = self.minutes_of_day() + minutes;
        let days = total.div_euclid(MINUTES_PER_DAY);
        let minute_of_day = total.rem_euclid(MINUTES_PER_DAY);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let time = Self {
            hour: (minute_of_day / 60) as u8,
            minute: (minute_of_day % 60) as u8,
            second: self.second,
        };
        (time, days)
    }
}

/// A calendar date, weekday 0 is Sunday
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct CalendarDate {
    /// e.g. 2024
    pub year: u16,
    /// 1..=12
    pub month: u8,
    /// 1..=31
    pub day: u8,
    /// 0..7, Sunday is 0
    pub weekday: u8,
}

impl CalendarDate {
    /// The day after this one
    pub const fn next_day(self) -> Self {
        let mut next = self;
        next.day += 1;

        if next.day > days_in_month(next.month, next.year) {
            next.day = 1;
            next.month += 1;

            if next.month > 12 {
                next.month = 1;
                next.year += 1;
            }
        }

        next.weekday = (next.weekday + 1) % 7;
        next
    }

    /// The day before this one
    pub const fn previous_day(self) -> Self {
        let mut previous = self;

        if previous.day > 1 {
            previous.day -= 1;
        } else {
            if previous.month > 1 {
                previous.month -= 1;
            } else {
                previous.month = 12;
                previous.year = previous.year.saturating_sub(1);
            }
            previous.day = days_in_month(previous.month, previous.year);
        }

        previous.weekday = (previous.weekday + 6) % 7;
        previous
    }
}

/// Shift a date and time by a signed number of minutes, rolling the date as needed.
pub fn shift_minutes(date: CalendarDate, time: WallTime, minutes: i32) -> (CalendarDate, WallTime) {
    let (time, days) = time.add_minutes(minutes);
    let mut date = date;
    for _ in 0..days.unsigned_abs() {
        date = if days > 0 {
            date.next_day()
        } else {
            date.previous_day()
        };
    }
    (date, time)
}

/// Get the number of days in a given month and year
pub const fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // all other months
    }
}

/// Check if a year is a leap year
/// A year is a leap year if it is divisible by 4, but not by 100, unless it is also divisible by 400.
pub const fn is_leap_year(year: u16) -> bool {
    year.is_multiple_of(4) && !year.is_multiple_of(100) || year.is_multiple_of(400)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper for dates, weekday is not checked by most tests
    const fn date(year: u16, month: u8, day: u8, weekday: u8) -> CalendarDate {
        CalendarDate {
            year,
            month,
            day,
            weekday,
        }
    }

    #[test]
    fn new_wraps_out_of_range_values() {
        assert_eq!(WallTime::new(24, 60, 61), WallTime::new(0, 0, 1));
    }

    #[test]
    fn add_minutes_within_the_day() {
        let (time, days) = WallTime::new(7, 30, 15).add_minutes(61);
        assert_eq!(time, WallTime::new(8, 31, 15));
        assert_eq!(days, 0);
    }

    #[test]
    fn add_minutes_rolls_over_midnight_both_ways() {
        let (time, days) = WallTime::new(23, 30, 0).add_minutes(60);
        assert_eq!(time, WallTime::new(0, 30, 0));
        assert_eq!(days, 1);

        let (time, days) = WallTime::new(0, 0, 42).add_minutes(-1);
        assert_eq!(time, WallTime::new(23, 59, 42));
        assert_eq!(days, -1);
    }

    #[test]
    fn next_day_handles_month_and_year_ends() {
        assert_eq!(date(2024, 1, 31, 3).next_day(), date(2024, 2, 1, 4));
        assert_eq!(date(2024, 12, 31, 2).next_day(), date(2025, 1, 1, 3));
        assert_eq!(date(2024, 6, 29, 6).next_day(), date(2024, 6, 30, 0));
    }

    #[test]
    fn leap_days() {
        assert_eq!(date(2024, 2, 28, 3).next_day(), date(2024, 2, 29, 4));
        assert_eq!(date(2023, 2, 28, 2).next_day(), date(2023, 3, 1, 3));
        assert_eq!(date(2024, 3, 1, 5).previous_day(), date(2024, 2, 29, 4));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
    }

    #[test]
    fn previous_day_handles_year_start() {
        assert_eq!(date(2025, 1, 1, 3).previous_day(), date(2024, 12, 31, 2));
        assert_eq!(date(2024, 7, 1, 1).previous_day(), date(2024, 6, 30, 0));
    }

    #[test]
    fn shift_minutes_rolls_the_date() {
        let (d, t) = shift_minutes(date(2024, 12, 31, 2), WallTime::new(23, 10, 5), 60);
        assert_eq!(d, date(2025, 1, 1, 3));
        assert_eq!(t, WallTime::new(0, 10, 5));

        let (d, t) = shift_minutes(date(2025, 1, 1, 3), WallTime::new(0, 0, 0), -1);
        assert_eq!(d, date(2024, 12, 31, 2));
        assert_eq!(t, WallTime::new(23, 59, 0));
    }
}
