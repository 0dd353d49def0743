//! # Buttons
//! Turns the raw pin levels of the five buttons into press and release events.
//!
//! The buttons are active low with pull ups. There is no debounce filter here, the tick loop polls the
//! pins every 50ms and that cadence is the debounce: a switch that bounces for less than one tick is
//! only ever seen in one state per poll. The tick must therefore never be faster than the bounce time
//! of the switches, `build.rs` refuses configurations below 50ms.
//!
//! On top of the events:
//! - `PressClassifier` measures how long the mode button was held and tells short from long presses.
//! - `AutoRepeat` makes a held adjust button fire once on press, then again after a hold delay and
//!   from then on at a fixed interval.
use embassy_time::{Duration, Instant};

/// The buttons of the system
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Button {
    /// Short press: leave edit mode or reset the time. Long press: toggle edit mode
    Mode,
    /// One hour later
    HourUp,
    /// One hour earlier
    HourDown,
    /// One minute later
    MinuteUp,
    /// One minute earlier
    MinuteDown,
}

impl Button {
    /// All buttons, in the order they are polled
    pub const ALL: [Self; 5] = [
        Self::Mode,
        Self::HourUp,
        Self::HourDown,
        Self::MinuteUp,
        Self::MinuteDown,
    ];

    /// Position of this button in `ALL`
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Raw level of a button pin
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Level {
    /// Pulled to ground, the button is pressed
    Low,
    /// Pulled up, the button is released
    High,
}

impl Level {
    /// Active low: a low pin is a pressed button
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Low)
    }
}

/// The levels of all button pins, read once per tick
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct ButtonLevels([Level; 5]);

impl ButtonLevels {
    /// No button pressed
    pub const RELEASED: Self = Self([Level::High; 5]);

    /// Levels in the order of `Button::ALL`
    pub const fn new(levels: [Level; 5]) -> Self {
        Self(levels)
    }

    /// All released except the given buttons
    #[cfg(test)]
    pub fn pressed(buttons: &[Button]) -> Self {
        let mut levels = Self::RELEASED;
        for button in buttons {
            levels.0[button.index()] = Level::Low;
        }
        levels
    }

    /// The level of one button
    pub const fn level(&self, button: Button) -> Level {
        self.0[button.index()]
    }

    /// True if any button is held down
    pub fn any_pressed(&self) -> bool {
        self.0.iter().any(|level| level.is_pressed())
    }
}

/// The two kinds of button events
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ButtonEventKind {
    /// released -> pressed
    Down,
    /// pressed -> released
    Up,
}

/// A change of a button, valid for the tick it was produced in
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct ButtonEvent {
    /// Which button changed
    pub button: Button,
    /// How it changed
    pub kind: ButtonEventKind,
    /// When the change was seen
    pub timestamp: Instant,
}

/// Edge detector for one button, polled once per tick
#[derive(Debug, Clone)]
pub struct DebouncedButton {
    /// The button being watched
    button: Button,
    /// The state seen on the last poll
    pressed: bool,
}

impl DebouncedButton {
    /// Create a new `DebouncedButton`, assumed released
    pub const fn new(button: Button) -> Self {
        Self {
            button,
            pressed: false,
        }
    }

    /// Feed the current pin level. Returns an event if the button changed since the last poll.
    pub const fn poll(&mut self, level: Level, now: Instant) -> Option<ButtonEvent> {
        let pressed = level.is_pressed();
        if pressed == self.pressed {
            return None;
        }
        self.pressed = pressed;
        let kind = if pressed {
            ButtonEventKind::Down
        } else {
            ButtonEventKind::Up
        };
        Some(ButtonEvent {
            button: self.button,
            kind,
            timestamp: now,
        })
    }

    /// The state seen on the last poll
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// The button being watched
    pub const fn button(&self) -> Button {
        self.button
    }
}

/// Result of a complete press, known on release
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Press {
    /// Released before the long press threshold
    Short,
    /// Held for the long press threshold or longer
    Long,
}

impl Press {
    /// Classify a press by how long it was held
    pub fn classify(held: Duration, long_press: Duration) -> Self {
        if held < long_press {
            Self::Short
        } else {
            Self::Long
        }
    }
}

/// Tells short from long presses by pairing each `Up` with the `Down` before it
#[derive(Debug, Clone)]
pub struct PressClassifier {
    /// When the button went down, `None` while released
    pressed_at: Option<Instant>,
    /// Threshold between short and long presses
    long_press: Duration,
}

impl PressClassifier {
    /// Create a new `PressClassifier`
    pub const fn new(long_press: Duration) -> Self {
        Self {
            pressed_at: None,
            long_press,
        }
    }

    /// Feed an event of the watched button, returns the completed press on release
    pub fn on_event(&mut self, event: &ButtonEvent) -> Option<Press> {
        match event.kind {
            ButtonEventKind::Down => {
                self.pressed_at = Some(event.timestamp);
                None
            }
            ButtonEventKind::Up => {
                // only an event that did not come from a `DebouncedButton` can be an Up without a Down
                let pressed_at = self.pressed_at.take()?;
                let held = event.timestamp.saturating_duration_since(pressed_at);
                Some(Press::classify(held, self.long_press))
            }
        }
    }
}

/// Repeat firing for a held button: once on press, again after `delay`, then every `interval`
#[derive(Debug, Clone)]
pub struct AutoRepeat {
    /// When the next repeat is due, `None` while released
    next_fire: Option<Instant>,
    /// Hold time before the first repeat
    delay: Duration,
    /// Time between repeats
    interval: Duration,
}

impl AutoRepeat {
    /// Create a new `AutoRepeat`
    pub const fn new(delay: Duration, interval: Duration) -> Self {
        Self {
            next_fire: None,
            delay,
            interval,
        }
    }

    /// Feed this tick's event (if any) and the held state of the button. Returns true if the action
    /// bound to the button should run this tick.
    pub fn update(&mut self, event: Option<&ButtonEvent>, held: bool, now: Instant) -> bool {
        if let Some(event) = event {
            match event.kind {
                ButtonEventKind::Down => {
                    self.next_fire = Some(event.timestamp + self.delay);
                    return true;
                }
                ButtonEventKind::Up => {
                    self.next_fire = None;
                    return false;
                }
            }
        }

        match self.next_fire {
            Some(due) if held && now >= due => {
                self.next_fire = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
