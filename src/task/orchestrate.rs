//! # Clock task
//! Runs the tick loop. It owns all hardware the clock uses and the `Orchestrator` with the state of
//! the clock, so nothing is shared between tasks except the watchdog heartbeat.
use defmt::{debug, info, warn};
use embassy_rp::rtc::Rtc;
use embassy_rp::peripherals::RTC;
use embassy_time::{Duration, Instant, Ticker, Timer};
use pico_buzzer_alarmclock::config::ClockConfig;
use pico_buzzer_alarmclock::event::Event;
use pico_buzzer_alarmclock::interfaces::DisplaySink;
use pico_buzzer_alarmclock::orchestrate::{Orchestrator, Peripherals};
use pico_buzzer_alarmclock::utility::string_utils::StringUtils;

use crate::task::{
    buttons::ButtonPins,
    display::{flush, init_display},
    resources::DisplayResources,
    sound::PwmBuzzer,
    time_updater::RtcClock,
    watchdog::report_heartbeat,
};

/// How long the boot message stays up after the RTC had to be set
const SETTING_TIME_MESSAGE_DURATION: Duration = Duration::from_millis(1000);

/// The clock. Never returns.
#[embassy_executor::task]
pub async fn clock(
    config: ClockConfig,
    buttons: ButtonPins,
    rtc: Rtc<'static, RTC>,
    mut buzzer: PwmBuzzer,
    display: DisplayResources,
) {
    info!("Clock task starting");
    let mut display = init_display(display).await;

    let (mut time, was_set) = RtcClock::new(rtc);
    if was_set {
        display.clear();
        display.set_cursor(0, 0);
        display.print(&StringUtils::message_row("Setting time..."));
        flush(&mut display).await;
        Timer::after(SETTING_TIME_MESSAGE_DURATION).await;
    }
    display.clear();

    let mut ticker = Ticker::every(config.tick_interval);
    let mut orchestrator = Orchestrator::new(config);
    info!(
        "Ticking every {}ms, alarm at {:02}:{:02}",
        orchestrator.config().tick_interval.as_millis(),
        orchestrator.state().alarm_settings.get_hour(),
        orchestrator.state().alarm_settings.get_minute()
    );

    loop {
        ticker.next().await;
        let now = Instant::now();

        let events = orchestrator.tick(
            now,
            buttons.read(),
            Peripherals {
                clock: &mut time,
                display: &mut display,
                buzzer: &mut buzzer,
            },
        );
        for event in &events {
            log_event(event);
        }

        buzzer.service(Instant::now());
        flush(&mut display).await;
        report_heartbeat(now);
    }
}

/// Log what happened during a tick
fn log_event(event: &Event) {
    match event {
        Event::AlarmTriggered => warn!("Alarm!"),
        Event::AlarmSettingsChanged(alarm) => debug!(
            "Alarm set to {:02}:{:02}",
            alarm.get_hour(),
            alarm.get_minute()
        ),
        Event::TimeAdjusted(adjustment) => debug!("Time adjusted: {:?}", adjustment),
        other => info!("{:?}", other),
    }
}
