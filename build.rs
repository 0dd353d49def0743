//! This build script does three things:
//! - it copies the `memory.x` file from the crate root into a directory where the linker can always
//!   find it, but only when we build for the RP2040. Host builds (unit tests) must not see the linker scripts.
//! - it reads `config/clock_config.json` and writes the tunables of the clock into `clock_config.rs`.
//! - it stamps the build time into `build_stamp.rs`, this is where the clock goes on a time reset.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::print_stdout)]

use serde::Deserialize;
use std::{
    env, fs,
    fs::File,
    io,
    io::Write,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// The configuration file, relative to the crate root
const CONFIG_FILE: &str = "config/clock_config.json";

/// Mechanical switches bounce for up to this long, the tick must not be faster
const MIN_TICK_INTERVAL_MS: u64 = 50;

fn main() {
    println!("cargo:rerun-if-changed={CONFIG_FILE}");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let target = env::var("TARGET").expect("TARGET environment variable not set");
    if target.starts_with("thumb") {
        memory_x();
    }

    let config = read_config();
    clock_config(&config).unwrap();
    build_stamp(config.utc_offset_minutes).unwrap();
}

/// The default alarm time in the configuration file
#[derive(Deserialize)]
struct AlarmTime {
    /// hour, 0..24
    hour: u8,
    /// minute, 0..60
    minute: u8,
}

/// The contents of `clock_config.json`
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ClockConfigFile {
    /// Polling period of the tick loop
    tick_interval_ms: u64,
    /// Presses at least this long toggle the mode
    long_press_ms: u64,
    /// Edit mode is left after this long without input
    edit_inactivity_timeout_ms: u64,
    /// Hold time before an adjust button starts repeating
    adjust_repeat_delay_ms: u64,
    /// Time between repeats of a held adjust button
    adjust_repeat_interval_ms: u64,
    /// How long the "Time reset!" confirmation stays up
    reset_confirmation_ms: u64,
    /// The alarm time after power up
    default_alarm: AlarmTime,
    /// Offset of local time to UTC, applied to the build stamp
    utc_offset_minutes: i64,
}

impl Default for ClockConfigFile {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            long_press_ms: 1000,
            edit_inactivity_timeout_ms: 5000,
            adjust_repeat_delay_ms: 200,
            adjust_repeat_interval_ms: 200,
            reset_confirmation_ms: 1000,
            default_alarm: AlarmTime { hour: 12, minute: 0 },
            utc_offset_minutes: 0,
        }
    }
}

/// Read and validate the configuration, falling back to the defaults if there is no file
fn read_config() -> ClockConfigFile {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR environment variable not set");
    let config_path = Path::new(&manifest_dir).join(CONFIG_FILE);

    let config = if config_path.exists() {
        let contents =
            fs::read_to_string(&config_path).expect("Could not read clock_config.json file");
        serde_json::from_str(&contents).expect("Could not parse clock_config.json file")
    } else {
        println!("cargo:warning=clock_config.json not found, using default values");
        ClockConfigFile::default()
    };

    assert!(
        config.tick_interval_ms >= MIN_TICK_INTERVAL_MS,
        "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}, buttons are only debounced by the tick"
    );
    assert!(config.default_alarm.hour < 24, "default_alarm.hour must be below 24");
    assert!(config.default_alarm.minute < 60, "default_alarm.minute must be below 60");
    assert!(
        config.adjust_repeat_interval_ms > 0,
        "adjust_repeat_interval_ms must not be zero"
    );
    config
}

/// Generate `clock_config.rs` from `clock_config.json`
fn clock_config(config: &ClockConfigFile) -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    let dest_path = Path::new(&out_dir).join("clock_config.rs");
    let mut f = File::create(dest_path)?;

    writeln!(f, "/// Polling period of the tick loop in ms")?;
    writeln!(f, "pub const TICK_INTERVAL_MS: u64 = {};", config.tick_interval_ms)?;
    writeln!(f, "/// Long press threshold in ms")?;
    writeln!(f, "pub const LONG_PRESS_MS: u64 = {};", config.long_press_ms)?;
    writeln!(f, "/// Edit mode inactivity timeout in ms")?;
    writeln!(
        f,
        "pub const EDIT_INACTIVITY_TIMEOUT_MS: u64 = {};",
        config.edit_inactivity_timeout_ms
    )?;
    writeln!(f, "/// Hold time before an adjust button repeats in ms")?;
    writeln!(
        f,
        "pub const ADJUST_REPEAT_DELAY_MS: u64 = {};",
        config.adjust_repeat_delay_ms
    )?;
    writeln!(f, "/// Repeat interval of a held adjust button in ms")?;
    writeln!(
        f,
        "pub const ADJUST_REPEAT_INTERVAL_MS: u64 = {};",
        config.adjust_repeat_interval_ms
    )?;
    writeln!(f, "/// Duration of the time reset confirmation in ms")?;
    writeln!(
        f,
        "pub const RESET_CONFIRMATION_MS: u64 = {};",
        config.reset_confirmation_ms
    )?;
    writeln!(f, "/// Alarm hour after power up")?;
    writeln!(f, "pub const DEFAULT_ALARM_HOUR: u8 = {};", config.default_alarm.hour)?;
    writeln!(f, "/// Alarm minute after power up")?;
    writeln!(f, "pub const DEFAULT_ALARM_MINUTE: u8 = {};", config.default_alarm.minute)?;
    Ok(())
}

/// Generate `build_stamp.rs`, the local date and time of this build.
/// `SOURCE_DATE_EPOCH` overrides the system clock for reproducible builds.
fn build_stamp(utc_offset_minutes: i64) -> io::Result<()> {
    let epoch_secs = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or_else(|| {
            let since_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("system clock is before 1970");
            i64::try_from(since_epoch.as_secs()).expect("system clock is too far in the future")
        });
    let local_secs = epoch_secs + utc_offset_minutes * 60;

    let days = local_secs.div_euclid(86_400);
    let secs_of_day = local_secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    // 1970-01-01 was a Thursday, Sunday is 0
    let weekday = (days + 4).rem_euclid(7);

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR environment variable not set");
    let dest_path = Path::new(&out_dir).join("build_stamp.rs");
    let mut f = File::create(dest_path)?;
    writeln!(f, "/// Year of the build")?;
    writeln!(f, "pub const BUILD_YEAR: u16 = {year};")?;
    writeln!(f, "/// Month of the build, 1..=12")?;
    writeln!(f, "pub const BUILD_MONTH: u8 = {month};")?;
    writeln!(f, "/// Day of the build, 1..=31")?;
    writeln!(f, "pub const BUILD_DAY: u8 = {day};")?;
    writeln!(f, "/// Weekday of the build, Sunday is 0")?;
    writeln!(f, "pub const BUILD_WEEKDAY: u8 = {weekday};")?;
    writeln!(f, "/// Hour of the build")?;
    writeln!(f, "pub const BUILD_HOUR: u8 = {};", secs_of_day / 3600)?;
    writeln!(f, "/// Minute of the build")?;
    writeln!(f, "pub const BUILD_MINUTE: u8 = {};", secs_of_day % 3600 / 60)?;
    writeln!(f, "/// Second of the build")?;
    writeln!(f, "pub const BUILD_SECOND: u8 = {};", secs_of_day % 60)?;
    Ok(())
}

/// Days since 1970-01-01 to a (year, month, day) in the proleptic Gregorian calendar
const fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

/// Handle the `memory.x` linker script
fn memory_x() {
    // Put `memory.x` in our output directory and ensure it's
    // on the linker search path.
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();
    println!("cargo:rustc-link-search={}", out.display());

    // By specifying `memory.x` here, we ensure the build script is only re-run when
    // `memory.x` is changed.
    println!("cargo:rerun-if-changed=memory.x");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
