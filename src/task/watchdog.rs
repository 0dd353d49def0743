//! Watchdog task to reset the system if the clock stops ticking
//!
//! The clock task reports a heartbeat after every tick. The hardware watchdog is started at boot and
//! fed only while heartbeats keep coming. If the tick loop stalls for longer than `STALL_TIMEOUT`, the
//! feeding stops and the hardware watchdog resets the chip. A hung executor never feeds it either.

use defmt::{info, warn};
use embassy_rp::{Peri, peripherals::WATCHDOG, watchdog::Watchdog};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Instant, Timer, with_timeout};

/// Longest acceptable gap between two ticks
const STALL_TIMEOUT: Duration = Duration::from_secs(2);
/// Time the clock task gets for the first tick, it brings up the display and the RTC before
const STARTUP_GRACE: Duration = Duration::from_secs(5);
/// Hardware watchdog timeout, the RP2040 allows a little over 8s
const HARDWARE_WATCHDOG_TIMEOUT: Duration = Duration::from_millis(8000);

/// Heartbeat of the clock task, carries the instant of the tick
static HEARTBEAT: Signal<CriticalSectionRawMutex, Instant> = Signal::new();

/// Report a completed tick
pub fn report_heartbeat(now: Instant) {
    HEARTBEAT.signal(now);
}

/// Watchdog task that keeps the hardware watchdog fed while the clock is alive
///
/// # Arguments
/// * `watchdog` - The watchdog peripheral from the RP2040
#[embassy_executor::task]
pub async fn watchdog_task(watchdog: Peri<'static, WATCHDOG>) {
    let mut wd = Watchdog::new(watchdog);
    wd.pause_on_debug(true);
    wd.start(HARDWARE_WATCHDOG_TIMEOUT);
    info!(
        "Watchdog started - tick stall limit {}ms, reset after {}ms",
        STALL_TIMEOUT.as_millis(),
        HARDWARE_WATCHDOG_TIMEOUT.as_millis()
    );

    let mut limit = STARTUP_GRACE;
    loop {
        if with_timeout(limit, HEARTBEAT.wait()).await.is_ok() {
            wd.feed();
            limit = STALL_TIMEOUT;
            continue;
        }

        warn!(
            "No tick for {}ms - system will reset in {}ms",
            limit.as_millis(),
            HARDWARE_WATCHDOG_TIMEOUT.as_millis()
        );
        // stop feeding and wait for the hardware watchdog to reset the system
        loop {
            Timer::after_secs(1).await;
        }
    }
}
