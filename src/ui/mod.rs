//! Hardware-facing user interface.
//!
//! - **Buttons** (gamepad): GPIO sampling feeding the debouncer
//! - **Display** (console): SSD1306 128×64 OLED via I²C showing the
//!   state of every controller slot

pub mod buttons;
pub mod display;
