//! # Orchestrate
//! The tick loop of the clock. One `Orchestrator` owns all state and is driven by a single task,
//! once per tick:
//!
//! 1. expire the time reset confirmation, if due
//! 2. read the time and render the first display row
//! 3. poll the buttons, the mode button is handled first
//! 4. any pressed button acknowledges a running alarm
//! 5. the adjust buttons move the alarm (edit mode) or the clock (normal mode), edit mode times out
//! 6. check the alarm trigger
//! 7. keep the buzzer going while the alarm is active
//!
//! Nothing in here blocks. Where the clock used to pause (after a time reset, after an adjustment) it
//! now records a deadline and checks it on the following ticks.
use crate::alarm_trigger::AlarmTrigger;
use crate::buttons::{AutoRepeat, Button, ButtonEvent, ButtonLevels, DebouncedButton, Press, PressClassifier};
use crate::config::ClockConfig;
use crate::event::{Event, Events, report};
use crate::interfaces::{DisplaySink, TimeSource, Tone, ToneSink};
use crate::state::{Adjustment, OperationMode, SystemState};
use crate::time::WallTime;
use crate::utility::string_utils::StringUtils;
use embassy_time::Instant;

/// Row of the time or alarm line
const STATUS_ROW: u8 = 0;
/// Row of messages: the alarm indicator and the time reset confirmation
const MESSAGE_ROW: u8 = 1;
/// Shown while the alarm is active
const ALARM_MESSAGE: &str = "ALARM!";
/// Shown after a time reset
const RESET_MESSAGE: &str = "Time reset!";

/// The external collaborators of the tick loop, borrowed for the duration of a tick
pub struct Peripherals<'a, T, D, B> {
    /// Where the time comes from
    pub clock: &'a mut T,
    /// Where the text goes
    pub display: &'a mut D,
    /// Where the beeps go
    pub buzzer: &'a mut B,
}

/// Owns the state of the clock and runs the tick loop
pub struct Orchestrator {
    /// Timing and defaults
    config: ClockConfig,
    /// Mode, alarm settings, alarm flag and edit deadline
    state: SystemState,
    /// Edge detectors, in the order of `Button::ALL`
    buttons: [DebouncedButton; 5],
    /// Short or long for the mode button
    mode_press: PressClassifier,
    /// Repeat logic of the adjust buttons, in the order of `Adjustment::ALL`
    repeats: [AutoRepeat; 4],
    /// Edge detector of the alarm minute
    trigger: AlarmTrigger,
    /// The time reset confirmation is up until this passes, then the display is cleared
    confirmation_until: Option<Instant>,
}

impl Orchestrator {
    /// Create a new `Orchestrator` in normal mode with the default alarm
    pub fn new(config: ClockConfig) -> Self {
        let repeat = AutoRepeat::new(config.repeat_delay, config.repeat_interval);
        Self {
            state: SystemState::new(config.default_alarm),
            buttons: Button::ALL.map(DebouncedButton::new),
            mode_press: PressClassifier::new(config.long_press),
            repeats: [repeat.clone(), repeat.clone(), repeat.clone(), repeat],
            trigger: AlarmTrigger::new(),
            confirmation_until: None,
            config,
        }
    }

    /// The state of the clock
    pub const fn state(&self) -> &SystemState {
        &self.state
    }

    /// The configuration the clock runs with
    pub const fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Stop the alarm without a button press. Returns true if it was active.
    pub fn acknowledge_alarm(&mut self, display: &mut impl DisplaySink, buzzer: &mut impl ToneSink) -> bool {
        if !self.state.acknowledge_alarm() {
            return false;
        }
        buzzer.silence();
        display.clear();
        true
    }

    /// Run one iteration of the tick loop. `now` is the uptime of the system, `levels` the button pins
    /// as read at the start of this tick. Returns what happened.
    pub fn tick<T, D, B>(
        &mut self,
        now: Instant,
        levels: ButtonLevels,
        io: Peripherals<'_, T, D, B>,
    ) -> Events
    where
        T: TimeSource,
        D: DisplaySink,
        B: ToneSink,
    {
        let Peripherals {
            clock,
            display,
            buzzer,
        } = io;
        let mut events = Events::new();

        self.expire_confirmation(now, display);

        let wall_time = clock.now();
        self.render_status(&wall_time, display);

        let mut button_events: [Option<ButtonEvent>; 5] = [None; 5];
        for (button, event) in self.buttons.iter_mut().zip(button_events.iter_mut()) {
            *event = button.poll(levels.level(button.button()), now);
        }

        if let Some(event) = &button_events[Button::Mode.index()] {
            if let Some(press) = self.mode_press.on_event(event) {
                self.handle_mode_press(press, now, clock, display, buzzer, &mut events);
            }
        }

        if levels.any_pressed() && self.acknowledge_alarm(display, buzzer) {
            // the clear also wiped the status row
            self.render_status(&wall_time, display);
            report(&mut events, Event::AlarmAcknowledged);
        }

        for (index, adjustment) in Adjustment::ALL.into_iter().enumerate() {
            let button = adjustment.button();
            let fire = self.repeats[index].update(
                button_events[button.index()].as_ref(),
                self.buttons[button.index()].is_pressed(),
                now,
            );
            if fire {
                self.handle_adjustment(adjustment, now, clock, &mut events);
            }
        }

        if self.state.edit_timed_out(now) {
            self.state.set_normal_mode();
            Tone::ACK.play(buzzer);
            report(&mut events, Event::EditTimedOut);
        }

        if self.trigger.check(
            wall_time,
            self.state.operation_mode,
            &self.state.alarm_settings,
        ) {
            self.state.raise_alarm();
            report(&mut events, Event::AlarmTriggered);
        }

        if self.state.is_alarm_active() {
            display.set_cursor(0, MESSAGE_ROW);
            display.print(&StringUtils::message_row(ALARM_MESSAGE));
            Tone::alarm(now.as_millis()).play(buzzer);
        }

        events
    }

    /// Clear the display once the time reset confirmation has been shown long enough
    fn expire_confirmation(&mut self, now: Instant, display: &mut impl DisplaySink) {
        if self.confirmation_until.is_some_and(|until| now >= until) {
            self.confirmation_until = None;
            display.clear();
        }
    }

    /// Time in normal mode, the alarm setting in edit mode
    fn render_status(&self, wall_time: &WallTime, display: &mut impl DisplaySink) {
        let row = match self.state.operation_mode {
            OperationMode::Normal => StringUtils::time_row(wall_time),
            OperationMode::EditAlarm => StringUtils::alarm_row(&self.state.alarm_settings),
        };
        display.set_cursor(0, STATUS_ROW);
        display.print(&row);
    }

    /// Handle a completed press of the mode button
    fn handle_mode_press(
        &mut self,
        press: Press,
        now: Instant,
        clock: &mut impl TimeSource,
        display: &mut impl DisplaySink,
        buzzer: &mut impl ToneSink,
        events: &mut Events,
    ) {
        match (press, self.state.operation_mode) {
            (Press::Short, OperationMode::EditAlarm) => {
                self.state.set_normal_mode();
                Tone::ACK.play(buzzer);
                report(events, Event::ModeChanged(OperationMode::Normal));
            }
            (Press::Short, OperationMode::Normal) => {
                // a reset is already being confirmed, do not reset again
                if self.confirmation_until.is_some() {
                    return;
                }
                clock.resync();
                display.set_cursor(0, MESSAGE_ROW);
                display.print(&StringUtils::message_row(RESET_MESSAGE));
                Tone::RESET.play(buzzer);
                self.confirmation_until = Some(now + self.config.reset_confirmation);
                report(events, Event::TimeReset);
            }
            (Press::Long, _) => {
                let mode = self.state.toggle_mode(now, self.config.edit_timeout);
                Tone::ACK.play(buzzer);
                report(events, Event::ModeChanged(mode));
            }
        }
    }

    /// An adjust button fired: move the alarm in edit mode, the clock in normal mode
    fn handle_adjustment(
        &mut self,
        adjustment: Adjustment,
        now: Instant,
        clock: &mut impl TimeSource,
        events: &mut Events,
    ) {
        match self.state.operation_mode {
            OperationMode::EditAlarm => {
                if self
                    .state
                    .edit_alarm(adjustment, now, self.config.edit_timeout)
                {
                    report(
                        events,
                        Event::AlarmSettingsChanged(self.state.alarm_settings.clone()),
                    );
                }
            }
            OperationMode::Normal => {
                clock.adjust_by(adjustment.minutes());
                report(events, Event::TimeAdjusted(adjustment));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Duration;
    use std::string::String;
    use std::vec::Vec;

    /// A clock that only moves when told to
    struct FakeClock {
        /// The time it reports
        time: WallTime,
        /// Every `adjust_by` call
        adjustments: Vec<i32>,
        /// Number of `resync` calls
        resyncs: usize,
    }

    impl FakeClock {
        fn at(hour: u8, minute: u8, second: u8) -> Self {
            Self {
                time: WallTime::new(hour, minute, second),
                adjustments: Vec::new(),
                resyncs: 0,
            }
        }
    }

    impl TimeSource for FakeClock {
        fn now(&mut self) -> WallTime {
            self.time
        }

        fn adjust(&mut self, time: WallTime) {
            self.time = time;
        }

        fn adjust_by(&mut self, minutes: i32) {
            self.adjustments.push(minutes);
            self.time = self.time.add_minutes(minutes).0;
        }

        fn resync(&mut self) {
            self.resyncs += 1;
            self.time = WallTime::new(9, 0, 0);
        }
    }

    /// A 16x2 text buffer that counts clears
    #[derive(Default)]
    struct RecordingDisplay {
        /// Text per row
        rows: [String; 2],
        /// Current row
        row: usize,
        /// Number of `clear` calls
        clears: usize,
    }

    impl DisplaySink for RecordingDisplay {
        fn set_cursor(&mut self, _col: u8, row: u8) {
            self.row = usize::from(row);
            self.rows[self.row].clear();
        }

        fn print(&mut self, text: &str) {
            self.rows[self.row].push_str(text);
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.rows = Default::default();
        }
    }

    /// Remembers every tone
    #[derive(Default)]
    struct RecordingBuzzer {
        /// (frequency, duration) of every `tone` call
        tones: Vec<(u32, Duration)>,
        /// Number of `silence` calls
        silences: usize,
    }

    impl ToneSink for RecordingBuzzer {
        fn tone(&mut self, frequency_hz: u32, duration: Duration) {
            self.tones.push((frequency_hz, duration));
        }

        fn silence(&mut self) {
            self.silences += 1;
        }
    }

    /// Test rig: the orchestrator and its fakes, ticking every 50ms
    struct Rig {
        orchestrator: Orchestrator,
        clock: FakeClock,
        display: RecordingDisplay,
        buzzer: RecordingBuzzer,
        now_ms: u64,
    }

    impl Rig {
        fn new(clock: FakeClock) -> Self {
            Self {
                orchestrator: Orchestrator::new(test_config()),
                clock,
                display: RecordingDisplay::default(),
                buzzer: RecordingBuzzer::default(),
                now_ms: 0,
            }
        }

        /// One tick at the current time, then advance the time by one tick
        fn tick(&mut self, pressed: &[Button]) -> Events {
            let events = self.orchestrator.tick(
                Instant::from_millis(self.now_ms),
                ButtonLevels::pressed(pressed),
                Peripherals {
                    clock: &mut self.clock,
                    display: &mut self.display,
                    buzzer: &mut self.buzzer,
                },
            );
            self.now_ms += 50;
            events
        }

        /// Tick until `now_ms` reaches `until_ms`
        fn tick_until(&mut self, until_ms: u64, pressed: &[Button]) -> Vec<Event> {
            let mut all = Vec::new();
            while self.now_ms < until_ms {
                all.extend(self.tick(pressed));
            }
            all
        }

        /// Hold the mode button for `held_ms`, then release it. Returns the events of the release tick.
        fn press_mode(&mut self, held_ms: u64) -> Events {
            let start = self.now_ms;
            self.tick_until(start + held_ms, &[Button::Mode]);
            self.tick(&[])
        }

        fn mode(&self) -> OperationMode {
            self.orchestrator.state().operation_mode
        }
    }

    fn test_config() -> ClockConfig {
        ClockConfig {
            tick_interval: Duration::from_millis(50),
            long_press: Duration::from_millis(1000),
            edit_timeout: Duration::from_millis(5000),
            repeat_delay: Duration::from_millis(200),
            repeat_interval: Duration::from_millis(200),
            reset_confirmation: Duration::from_millis(1000),
            default_alarm: (12, 0),
        }
    }

    #[test]
    fn renders_the_time_in_normal_mode() {
        let mut rig = Rig::new(FakeClock::at(7, 5, 9));
        rig.tick(&[]);
        assert_eq!(rig.display.rows[0], "Time: 07:05:09  ");
        assert!(rig.buzzer.tones.is_empty());
    }

    #[test]
    fn long_press_enters_edit_mode_and_renders_the_alarm() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        let events = rig.press_mode(1000);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);
        assert!(events.contains(&Event::ModeChanged(OperationMode::EditAlarm)));
        assert_eq!(rig.buzzer.tones, [(500, Duration::from_millis(100))]);

        rig.tick(&[]);
        assert_eq!(rig.display.rows[0], "Alarm: 12:00    ");
    }

    #[test]
    fn press_of_999ms_takes_the_short_path() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        // start at 1ms so the release lands exactly 999ms after the press
        rig.now_ms = 1;
        rig.tick(&[Button::Mode]);
        rig.now_ms = 1000;
        let events = rig.tick(&[]);
        assert_eq!(rig.mode(), OperationMode::Normal);
        assert!(events.contains(&Event::TimeReset));
        assert_eq!(rig.clock.resyncs, 1);
    }

    #[test]
    fn short_press_in_normal_mode_resets_the_time_without_blocking() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        let events = rig.press_mode(100);
        assert!(events.contains(&Event::TimeReset));
        assert_eq!(rig.clock.resyncs, 1);
        assert_eq!(rig.display.rows[1], "Time reset!     ");
        assert_eq!(rig.buzzer.tones, [(800, Duration::from_millis(200))]);
        let clears_before = rig.display.clears;

        // the loop keeps running during the confirmation, the time is still rendered
        let reset_at = rig.now_ms - 50;
        rig.tick_until(reset_at + 800, &[]);
        assert_eq!(rig.display.rows[0], "Time: 09:00:00  ");
        assert_eq!(rig.display.clears, clears_before);

        // a second short press during the confirmation does not reset again
        rig.tick(&[Button::Mode]);
        rig.tick(&[]);
        assert_eq!(rig.clock.resyncs, 1);
        assert_eq!(rig.display.clears, clears_before);

        // cleared exactly once when the confirmation expires
        rig.tick_until(reset_at + 2000, &[]);
        assert_eq!(rig.display.clears, clears_before + 1);
        assert_eq!(rig.display.rows[1], "");
    }

    #[test]
    fn short_press_in_edit_mode_goes_back_to_normal() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        rig.press_mode(1500);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);

        let events = rig.press_mode(200);
        assert_eq!(rig.mode(), OperationMode::Normal);
        assert!(events.contains(&Event::ModeChanged(OperationMode::Normal)));
        assert_eq!(rig.clock.resyncs, 0);
        assert_eq!(rig.buzzer.tones.len(), 2);
    }

    #[test]
    fn long_press_in_edit_mode_toggles_back() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        rig.press_mode(1000);
        rig.press_mode(2000);
        assert_eq!(rig.mode(), OperationMode::Normal);
    }

    #[test]
    fn edit_mode_times_out_after_five_seconds() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        rig.press_mode(1000);
        let entered_at = rig.now_ms - 50;
        assert_eq!(rig.mode(), OperationMode::EditAlarm);

        rig.tick_until(entered_at + 5000, &[]);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);

        let events = rig.tick(&[]);
        assert_eq!(rig.mode(), OperationMode::Normal);
        assert!(events.contains(&Event::EditTimedOut));
        assert_eq!(rig.buzzer.tones.last(), Some(&(500, Duration::from_millis(100))));
    }

    #[test]
    fn alarm_edits_wrap_and_extend_the_deadline() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        rig.press_mode(1000);

        // 4s into edit mode, one tap of hour down
        rig.tick_until(rig.now_ms + 4000, &[]);
        let edited_at = rig.now_ms;
        let events = rig.tick(&[Button::HourDown]);
        assert!(events.contains(&Event::AlarmSettingsChanged(crate::state::AlarmSettings::new(11, 0))));
        rig.tick(&[]);

        // minute down from 0 wraps to 59
        rig.tick(&[Button::MinuteDown]);
        rig.tick(&[]);
        let alarm = &rig.orchestrator.state().alarm_settings;
        assert_eq!((alarm.get_hour(), alarm.get_minute()), (11, 59));

        // still editing past the first deadline
        rig.tick_until(edited_at + 4900, &[]);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);
        assert!(rig.clock.adjustments.is_empty());
    }

    #[test]
    fn held_adjust_button_repeats_every_200ms() {
        let mut rig = Rig::new(FakeClock::at(8, 0, 0));
        rig.tick_until(rig.now_ms + 650, &[Button::MinuteUp]);
        rig.tick(&[]);
        // fired at 0, 200, 400, 600
        assert_eq!(rig.clock.adjustments, [1, 1, 1, 1]);
        assert_eq!(rig.clock.time, WallTime::new(8, 4, 0));
    }

    #[test]
    fn normal_mode_adjusts_the_clock() {
        let mut rig = Rig::new(FakeClock::at(23, 30, 0));
        let events = rig.tick(&[Button::HourUp]);
        assert!(events.contains(&Event::TimeAdjusted(Adjustment::HourUp)));
        rig.tick(&[]);
        rig.tick(&[Button::HourDown]);
        rig.tick(&[]);
        assert_eq!(rig.clock.adjustments, [60, -60]);
        assert_eq!(rig.clock.time, WallTime::new(23, 30, 0));
        assert_eq!(rig.orchestrator.state().alarm_settings.get_hour(), 12);
    }

    #[test]
    fn alarm_rings_until_a_button_is_pressed() {
        let mut rig = Rig::new(FakeClock::at(7, 29, 59));
        rig.orchestrator.state.alarm_settings.set_time((7, 30));

        rig.tick(&[]);
        assert!(!rig.orchestrator.state().is_alarm_active());

        rig.clock.time = WallTime::new(7, 30, 0);
        let events = rig.tick(&[]);
        assert!(events.contains(&Event::AlarmTriggered));
        assert!(rig.orchestrator.state().is_alarm_active());
        assert_eq!(rig.display.rows[1], "ALARM!          ");

        // the buzzer is fed every tick, also after the alarm minute is over
        let tones_before = rig.buzzer.tones.len();
        rig.tick(&[]);
        rig.clock.time = WallTime::new(7, 31, 5);
        rig.tick(&[]);
        assert_eq!(rig.buzzer.tones.len(), tones_before + 2);
        assert!(rig.buzzer.tones.iter().all(|(f, _)| (1000..1200).contains(f)));
        assert!(rig.orchestrator.state().is_alarm_active());

        // any button stops it within the same tick
        let events = rig.tick(&[Button::MinuteUp]);
        assert!(events.contains(&Event::AlarmAcknowledged));
        assert!(!rig.orchestrator.state().is_alarm_active());
        assert_eq!(rig.buzzer.silences, 1);
        let tones_after = rig.buzzer.tones.len();
        rig.tick(&[]);
        rig.tick(&[]);
        assert_eq!(rig.buzzer.tones.len(), tones_after);
    }

    #[test]
    fn alarm_is_acknowledged_by_the_first_tick_of_a_mode_press() {
        let mut rig = Rig::new(FakeClock::at(12, 0, 0));
        rig.tick(&[]);
        assert!(rig.orchestrator.state().is_alarm_active());

        // the first tick of a long press already stops the alarm
        let events = rig.tick(&[Button::Mode]);
        assert!(events.contains(&Event::AlarmAcknowledged));
        rig.tick_until(rig.now_ms + 1000, &[Button::Mode]);
        rig.tick(&[]);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);
        assert!(!rig.orchestrator.state().is_alarm_active());
    }

    #[test]
    fn alarm_is_acknowledged_in_edit_mode_too() {
        let mut rig = Rig::new(FakeClock::at(11, 59, 59));

        // mode is held through the alarm minute, the alarm goes off with the button still down
        rig.tick_until(1000, &[Button::Mode]);
        rig.clock.time = WallTime::new(12, 0, 0);
        let events = rig.tick(&[Button::Mode]);
        assert!(events.contains(&Event::AlarmTriggered));

        // releasing it is a long press, edit mode starts with the alarm still ringing
        rig.tick(&[]);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);
        assert!(rig.orchestrator.state().is_alarm_active());

        let events = rig.tick(&[Button::HourUp]);
        assert!(events.contains(&Event::AlarmAcknowledged));
        assert!(!rig.orchestrator.state().is_alarm_active());
        assert_eq!(rig.mode(), OperationMode::EditAlarm);
        // the status row survives the clear of the acknowledgment
        assert_eq!(rig.display.rows[0], "Alarm: 12:00    ");
        // the acknowledging press still edits the alarm
        assert_eq!(rig.orchestrator.state().alarm_settings.get_hour(), 13);
    }

    #[test]
    fn status_row_is_redrawn_after_acknowledgment() {
        let mut rig = Rig::new(FakeClock::at(12, 0, 0));
        rig.tick(&[]);
        assert!(rig.orchestrator.state().is_alarm_active());

        rig.tick(&[Button::MinuteDown]);
        assert!(!rig.orchestrator.state().is_alarm_active());
        assert_eq!(rig.display.rows[0], "Time: 12:00:00  ");
        assert_eq!(rig.display.rows[1], "");
    }

    #[test]
    fn alarm_does_not_fire_while_editing() {
        let mut rig = Rig::new(FakeClock::at(11, 59, 58));
        rig.press_mode(1000);
        assert_eq!(rig.mode(), OperationMode::EditAlarm);
        rig.clock.time = WallTime::new(12, 0, 0);
        let events = rig.tick(&[]);
        assert!(!events.contains(&Event::AlarmTriggered));
        assert!(!rig.orchestrator.state().is_alarm_active());
    }

    #[test]
    fn explicit_acknowledgment_clears_the_alarm() {
        let mut rig = Rig::new(FakeClock::at(12, 0, 0));
        rig.tick(&[]);
        assert!(rig.orchestrator.acknowledge_alarm(&mut rig.display, &mut rig.buzzer));
        assert!(!rig.orchestrator.acknowledge_alarm(&mut rig.display, &mut rig.buzzer));
        assert_eq!(rig.buzzer.silences, 1);
    }
}
