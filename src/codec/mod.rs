//! Button frame codec shared by both roles.
//!
//! A frame is one packed snapshot of every button of a controller:
//!
//! ```text
//! Byte 0: buttons 0-7   (bit i = button i)
//! Byte 1: buttons 8-K-1 (only present when the layout has more than 8)
//! ```
//!
//! The button order depends on the [`ButtonLayout`]; the meaning of a set
//! bit depends on the [`Polarity`]. Bits past the last button are always
//! zero on the wire.

mod frame;
mod layout;

#[cfg(test)]
mod tests;

pub use frame::{ButtonFrame, MAX_WIRE_LEN};
pub use layout::ButtonLayout;

/// Every button name used by any gamepad variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    Back,
    Start,
    M,
    P,
    Pause,
}

impl Button {
    /// Upper-case label used in logs and on the status display.
    pub const fn name(self) -> &'static str {
        match self {
            Button::Up => "UP",
            Button::Down => "DOWN",
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
            Button::Back => "BACK",
            Button::Start => "START",
            Button::M => "M",
            Button::P => "P",
            Button::Pause => "PAUSE",
        }
    }
}

/// Meaning of a set bit on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Bit set = pressed.
    #[default]
    PressedHigh,
    /// Bit set = released (raw pull-up levels).
    PressedLow,
}
