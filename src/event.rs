//! Events reported by the tick loop
//!
//! The state machine does not log, it reports what happened during a tick and the firmware decides
//! what to do with it (log it, mostly).

use crate::state::{Adjustment, AlarmSettings, OperationMode};
use heapless::Vec;

/// The most events a single tick can produce: a mode change, a time reset, an acknowledgment,
/// four adjustments, an edit timeout and the alarm itself, with some room to spare
pub const MAX_EVENTS_PER_TICK: usize = 12;

/// The events of one tick
pub type Events = Vec<Event, MAX_EVENTS_PER_TICK>;

/// The event type used in the system, representing what changed during a tick
#[derive(PartialEq, Eq, Debug, Clone)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Event {
    /// The mode changed through a button press, the data is the new mode
    ModeChanged(OperationMode),
    /// Edit mode was left because nothing was edited for too long
    EditTimedOut,
    /// The clock was set back to the build time
    TimeReset,
    /// The clock was moved by an adjust button, the data is the adjustment
    TimeAdjusted(Adjustment),
    /// The alarm time was changed in edit mode, the data is the new setting
    AlarmSettingsChanged(AlarmSettings),
    /// The alarm must be raised
    AlarmTriggered,
    /// The alarm was stopped by a button press or an explicit acknowledgment
    AlarmAcknowledged,
}

/// Record an event. The capacity covers everything one tick can do, so a full list is not expected.
pub fn report(events: &mut Events, event: Event) {
    // dropping an event only loses a log line, the state itself is already updated
    let _ = events.push(event);
}
