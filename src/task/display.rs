//! # Display
//! The clock thinks in a 16x2 character display. Here that grid is drawn onto the 128x64 OLED with a
//! 7x13 font, one text row per grid row.
//!
//! Drawing only touches the frame buffer of the display driver, nothing is sent to the display before
//! `flush()`. The clock task flushes once per tick, after the tick loop is done.
use defmt::{Debug2Format, error, warn};
use embassy_rp::i2c::{Async, Config, I2c};
use embassy_rp::peripherals::I2C0;
use embedded_graphics::{
    mono_font::{MonoTextStyle, MonoTextStyleBuilder, ascii::FONT_7X13},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use pico_buzzer_alarmclock::interfaces::DisplaySink;
use ssd1306_async::{I2CDisplayInterface, Ssd1306, prelude::*};

use crate::task::resources::{DisplayResources, Irqs};

/// Width of one character cell in pixels
const CELL_WIDTH: i32 = 7;
/// Height of one grid row in pixels, the font is 13 high
const ROW_PITCH: i32 = 20;
/// Top left corner of the grid, the 16 columns are 112 pixels wide
const GRID_ORIGIN: Point = Point::new(8, 12);

/// The driver of the OLED, in buffered graphics mode
pub type Oled = Ssd1306<
    I2CInterface<I2c<'static, I2C0, Async>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// A character grid on top of a monochrome draw target
pub struct TextDisplay<D> {
    /// Where the pixels go
    target: D,
    /// Top left corner of the next character
    cursor: Point,
    /// Text style, the background overwrites whatever was drawn before
    style: MonoTextStyle<'static, BinaryColor>,
}

impl<D> TextDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    /// Create a new `TextDisplay` with the cursor in the top left corner
    pub fn new(target: D) -> Self {
        Self {
            target,
            cursor: GRID_ORIGIN,
            style: MonoTextStyleBuilder::new()
                .font(&FONT_7X13)
                .text_color(BinaryColor::On)
                .background_color(BinaryColor::Off)
                .build(),
        }
    }

    /// The draw target, for flushing
    pub const fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }
}

impl<D> DisplaySink for TextDisplay<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = GRID_ORIGIN + Point::new(i32::from(col) * CELL_WIDTH, i32::from(row) * ROW_PITCH);
    }

    fn print(&mut self, text: &str) {
        match Text::with_baseline(text, self.cursor, self.style, Baseline::Top).draw(&mut self.target) {
            Ok(next) => self.cursor = next,
            Err(_) => warn!("Failed to draw text"),
        }
    }

    fn clear(&mut self) {
        if self.target.clear(BinaryColor::Off).is_err() {
            warn!("Failed to clear the frame buffer");
        }
        self.cursor = GRID_ORIGIN;
    }
}

/// Bring up the I2C bus and the OLED. A display that does not answer is logged and kept, the clock
/// keeps running and every flush fails with a warning.
pub async fn init_display(r: DisplayResources) -> TextDisplay<Oled> {
    let mut config = Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_async(r.i2c0, r.scl, r.sda, Irqs, config);

    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if let Err(e) = display.init().await {
        error!("Failed to initialize display: {}", Debug2Format(&e));
    } else if let Err(e) = display.set_brightness(Brightness::DIM).await {
        warn!("Failed to dim the display: {}", Debug2Format(&e));
    }

    TextDisplay::new(display)
}

/// Send the frame buffer to the display
pub async fn flush(display: &mut TextDisplay<Oled>) {
    if let Err(e) = display.target_mut().flush().await {
        warn!("Failed to flush the display: {}", Debug2Format(&e));
    }
}
