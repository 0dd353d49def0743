//! # Sound
//! A passive buzzer on a PWM output. A tone is a square wave at 50% duty, the frequency is set through
//! the wrap value of the PWM slice with a fixed clock divider.
//!
//! Tones have a duration but nothing waits for it: `tone` records when the tone must stop and the
//! clock task calls `service` every tick to end it. A tone therefore lasts a whole number of ticks.
use defmt::{debug, info};
use embassy_rp::Peri;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::peripherals::{PIN_6, PWM_SLICE3};
use embassy_rp::pwm::{Config, Pwm};
use embassy_time::{Duration, Instant};
use pico_buzzer_alarmclock::interfaces::ToneSink;

/// Clock divider of the PWM slice. With the 125MHz system clock a 16 bit wrap reaches down to 30Hz.
const PWM_DIVIDER: u8 = 64;

/// Buzzer on GP6, PWM slice 3 channel A
pub struct PwmBuzzer {
    /// The PWM output
    pwm: Pwm<'static>,
    /// The configuration last written to the slice
    config: Config,
    /// When the current tone ends, `None` while silent
    silence_at: Option<Instant>,
}

impl PwmBuzzer {
    /// Create a new `PwmBuzzer`, silent
    pub fn new(slice: Peri<'static, PWM_SLICE3>, pin: Peri<'static, PIN_6>) -> Self {
        let mut config = Config::default();
        config.divider = PWM_DIVIDER.into();
        config.enable = false;
        let pwm = Pwm::new_output_a(slice, pin, config.clone());
        info!("Buzzer ready");
        Self {
            pwm,
            config,
            silence_at: None,
        }
    }

    /// End the current tone if it has played long enough
    pub fn service(&mut self, now: Instant) {
        if self.silence_at.is_some_and(|at| now >= at) {
            self.silence();
        }
    }

    /// The wrap value of the PWM counter for a frequency
    fn top_for(frequency_hz: u32) -> u16 {
        let counts = clk_sys_freq() / u32::from(PWM_DIVIDER) / frequency_hz;
        u16::try_from(counts.saturating_sub(1)).unwrap_or(u16::MAX)
    }
}

impl ToneSink for PwmBuzzer {
    fn tone(&mut self, frequency_hz: u32, duration: Duration) {
        if frequency_hz == 0 {
            self.silence();
            return;
        }
        let top = Self::top_for(frequency_hz);
        self.config.top = top;
        self.config.compare_a = top / 2;
        self.config.enable = true;
        self.pwm.set_config(&self.config);
        self.silence_at = Some(Instant::now() + duration);
        debug!("Tone {}Hz for {}ms", frequency_hz, duration.as_millis());
    }

    fn silence(&mut self) {
        self.config.compare_a = 0;
        self.config.enable = false;
        self.pwm.set_config(&self.config);
        self.silence_at = None;
    }
}
