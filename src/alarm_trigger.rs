//! # Alarm trigger
//! Decides when the alarm goes off. The clock is polled every tick, so "the time matches the alarm" is
//! true for a whole minute and "second is 0" for a good number of ticks in a row. The trigger fires on
//! the edge instead: the first tick that sees second 0 after a tick that saw anything else.
//! That is at most once per matching minute, and once a day for a daily alarm.
use crate::state::{AlarmSettings, OperationMode};
use crate::time::WallTime;

/// Edge detector for the alarm minute
#[derive(Debug, Clone, Default)]
pub struct AlarmTrigger {
    /// The second seen on the previous check, `None` before the first one
    prev_second: Option<u8>,
}

impl AlarmTrigger {
    /// Create a new `AlarmTrigger` that has not seen any time yet
    pub const fn new() -> Self {
        Self { prev_second: None }
    }

    /// Check the current time against the alarm. Returns true if the alarm must go off now.
    /// Every call records `now.second` as the previous second for the next call, firing or not.
    pub const fn check(
        &mut self,
        now: WallTime,
        mode: OperationMode,
        alarm: &AlarmSettings,
    ) -> bool {
        let fires = should_fire(now, self.prev_second, mode, alarm);
        self.prev_second = Some(now.second);
        fires
    }

    /// The second seen on the previous check
    #[cfg(test)]
    pub const fn prev_second(&self) -> Option<u8> {
        self.prev_second
    }
}

/// The alarm fires in normal mode only, when hour and minute match, the second is 0 and the
/// previously seen second was not. Not having seen a second yet counts as "not 0".
pub const fn should_fire(
    now: WallTime,
    prev_second: Option<u8>,
    mode: OperationMode,
    alarm: &AlarmSettings,
) -> bool {
    let second_edge = now.second == 0 && !matches!(prev_second, Some(0));
    matches!(mode, OperationMode::Normal)
        && now.hour == alarm.get_hour()
        && now.minute == alarm.get_minute()
        && second_edge
}
