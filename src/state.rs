//! # State of the system
//! This module describes the state of the clock and the operations that can be performed on the state.
//! The policy deciding *when* to call these lives in the orchestrator, this module only keeps the state
//! consistent: the edit deadline only exists in edit mode and alarm times are always in range.
use crate::buttons::Button;
use embassy_time::{Duration, Instant};

/// All the states of the system are kept in this struct.
#[derive(PartialEq, Eq, Debug, Clone)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct SystemState {
    /// The operation mode of the system
    pub operation_mode: OperationMode,
    /// The settings for the alarm
    pub alarm_settings: AlarmSettings,
    /// The alarm went off and nobody has acknowledged it yet
    alarm_active: bool,
    /// Edit mode is left when this passes, only set in edit mode
    edit_deadline: Option<Instant>,
}

/// State transitions
impl SystemState {
    /// Create a new `SystemState`, starting in normal mode with the alarm silent.
    pub const fn new(default_alarm: (u8, u8)) -> Self {
        Self {
            operation_mode: OperationMode::Normal,
            alarm_settings: AlarmSettings::new(default_alarm.0, default_alarm.1),
            alarm_active: false,
            edit_deadline: None,
        }
    }

    /// Set the system to normal mode
    pub const fn set_normal_mode(&mut self) {
        self.operation_mode = OperationMode::Normal;
        self.edit_deadline = None;
    }

    /// Set the system to edit alarm mode, the inactivity countdown starts now
    pub fn set_edit_alarm_mode(&mut self, now: Instant, timeout: Duration) {
        self.operation_mode = OperationMode::EditAlarm;
        self.edit_deadline = Some(now + timeout);
    }

    /// Switch between normal and edit alarm mode, returns the new mode
    pub fn toggle_mode(&mut self, now: Instant, timeout: Duration) -> OperationMode {
        match self.operation_mode {
            OperationMode::Normal => self.set_edit_alarm_mode(now, timeout),
            OperationMode::EditAlarm => self.set_normal_mode(),
        }
        self.operation_mode
    }

    /// The instant edit mode times out, `None` in normal mode
    #[cfg(test)]
    pub const fn edit_deadline(&self) -> Option<Instant> {
        self.edit_deadline
    }

    /// True if we are in edit mode and nothing was edited for too long
    pub fn edit_timed_out(&self, now: Instant) -> bool {
        self.operation_mode == OperationMode::EditAlarm
            && self.edit_deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Apply an adjustment to the alarm time. Only allowed in edit mode, where it also restarts the
    /// inactivity countdown. Returns false and changes nothing in normal mode.
    pub fn edit_alarm(&mut self, adjustment: Adjustment, now: Instant, timeout: Duration) -> bool {
        if self.operation_mode != OperationMode::EditAlarm {
            return false;
        }
        match adjustment {
            Adjustment::HourUp => self.alarm_settings.increment_alarm_hour(),
            Adjustment::HourDown => self.alarm_settings.decrement_alarm_hour(),
            Adjustment::MinuteUp => self.alarm_settings.increment_alarm_minute(),
            Adjustment::MinuteDown => self.alarm_settings.decrement_alarm_minute(),
        }
        self.edit_deadline = Some(now + timeout);
        true
    }

    /// The alarm went off
    pub const fn raise_alarm(&mut self) {
        self.alarm_active = true;
    }

    /// Acknowledge the alarm. Returns true if it was active.
    pub const fn acknowledge_alarm(&mut self) -> bool {
        let was_active = self.alarm_active;
        self.alarm_active = false;
        was_active
    }

    /// Check if the alarm is active
    pub const fn is_alarm_active(&self) -> bool {
        self.alarm_active
    }
}

/// The operation mode of the system
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum OperationMode {
    /// The regular operation mode.
    ///
    /// Displays the time. The adjust buttons set the clock and the alarm can go off.
    Normal,
    /// Setting the alarm time.
    ///
    /// Displays the alarm time, the adjust buttons change it. The alarm does not go off in this mode.
    EditAlarm,
}

/// The settings for the alarm
#[derive(Eq, PartialEq, Debug, Clone)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct AlarmSettings {
    /// The alarm time, (hour, minute)
    time: (u8, u8),
}

impl AlarmSettings {
    /// Create new `AlarmSettings`, out of range values wrap
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self {
            time: (hour % 24, minute % 60),
        }
    }

    /// Set the alarm time
    pub const fn set_time(&mut self, time: (u8, u8)) {
        self.time = (time.0 % 24, time.1 % 60);
    }

    /// Get the alarm time hour
    pub const fn get_hour(&self) -> u8 {
        self.time.0
    }

    /// Get the alarm time minute
    pub const fn get_minute(&self) -> u8 {
        self.time.1
    }

    /// Increment the alarm hour
    pub const fn increment_alarm_hour(&mut self) {
        let hour = (self.get_hour() + 1) % 24;
        self.set_time((hour, self.get_minute()));
    }

    /// Decrement the alarm hour
    pub const fn decrement_alarm_hour(&mut self) {
        let hour = (self.get_hour() + 23) % 24;
        self.set_time((hour, self.get_minute()));
    }

    /// Increment the alarm minute
    pub const fn increment_alarm_minute(&mut self) {
        let minute = (self.get_minute() + 1) % 60;
        self.set_time((self.get_hour(), minute));
    }

    /// Decrement the alarm minute
    pub const fn decrement_alarm_minute(&mut self) {
        let minute = (self.get_minute() + 59) % 60;
        self.set_time((self.get_hour(), minute));
    }
}

/// What an adjust button does: move the alarm in edit mode, move the clock in normal mode
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Adjustment {
    /// One hour later
    HourUp,
    /// One hour earlier
    HourDown,
    /// One minute later
    MinuteUp,
    /// One minute earlier
    MinuteDown,
}

impl Adjustment {
    /// All adjustments, in the order their buttons are serviced
    pub const ALL: [Self; 4] = [Self::HourUp, Self::HourDown, Self::MinuteUp, Self::MinuteDown];

    /// The signed number of minutes this adjustment moves the clock
    pub const fn minutes(self) -> i32 {
        match self {
            Self::HourUp => 60,
            Self::HourDown => -60,
            Self::MinuteUp => 1,
            Self::MinuteDown => -1,
        }
    }

    /// The button bound to this adjustment
    pub const fn button(self) -> Button {
        match self {
            Self::HourUp => Button::HourUp,
            Self::HourDown => Button::HourDown,
            Self::MinuteUp => Button::MinuteUp,
            Self::MinuteDown => Button::MinuteDown,
        }
    }
}
