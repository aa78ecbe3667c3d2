//! SSD1306 OLED status screen of the console.

use core::fmt::Write;

use crate::input::Snapshot;
use crate::link::SlotId;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// 21 columns of 6 px on a 128 px line.
type Line = String<21>;

fn slot_line<const N: usize>(snapshot: &Snapshot<N>, slot: SlotId) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "P{} ", slot.get());
    match snapshot.frame(slot) {
        None => {
            let _ = line.push_str("--");
        }
        Some(frame) if frame.is_idle() => {
            let _ = line.push_str("ready");
        }
        Some(frame) => {
            for button in frame.pressed() {
                // Stop at the edge rather than wrap.
                if line.push_str(button.name()).is_err() || line.push(' ').is_err() {
                    break;
                }
            }
        }
    }
    line
}

/// One line per controller slot plus a scanning hint while slots are free.
pub fn draw_status<I2C, const N: usize>(
    display: &mut Display<I2C>,
    snapshot: &Snapshot<N>,
    scanning: bool,
) where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("padlink", Point::new(0, 10), text_style()).draw(display);

    for (row, slot) in (1..=N as u8).filter_map(SlotId::new).enumerate() {
        let line = slot_line(snapshot, slot);
        let y = 24 + (row as i32 * 12);
        let _ = Text::new(line.as_str(), Point::new(0, y), text_style()).draw(display);
    }

    if scanning {
        let _ = Text::new("Searching...", Point::new(0, 60), text_style()).draw(display);
    }

    let _ = display.flush();
}
