//! Packed button frame.

use super::{Button, ButtonLayout, Polarity};
use crate::error::DecodeError;

/// Largest wire payload of any layout.
pub const MAX_WIRE_LEN: usize = 2;

/// Logical state of every button of one controller.
///
/// Bit i is set when button i (in layout order) is pressed. Bits past the
/// layout's button count are always zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonFrame {
    layout: ButtonLayout,
    bits: u16,
}

impl ButtonFrame {
    /// All buttons released.
    pub const fn released(layout: ButtonLayout) -> Self {
        Self { layout, bits: 0 }
    }

    /// Build from logical pressed-bits; bits outside the layout are dropped.
    pub const fn from_bits(layout: ButtonLayout, bits: u16) -> Self {
        Self {
            layout,
            bits: bits & layout.mask(),
        }
    }

    /// Build from an ordered boolean array, one entry per button.
    ///
    /// Returns `None` if `states` does not have exactly `layout.count()`
    /// entries.
    pub fn from_states(layout: ButtonLayout, states: &[bool]) -> Option<Self> {
        if states.len() != layout.count() {
            return None;
        }
        let bits = states
            .iter()
            .enumerate()
            .fold(0u16, |acc, (i, &pressed)| acc | (u16::from(pressed) << i));
        Some(Self { layout, bits })
    }

    /// Build from the set of pressed buttons. Buttons the layout lacks
    /// are ignored.
    pub fn from_pressed(layout: ButtonLayout, pressed: &[Button]) -> Self {
        let mut frame = Self::released(layout);
        for &button in pressed {
            frame.set(button, true);
        }
        frame
    }

    pub const fn layout(&self) -> ButtonLayout {
        self.layout
    }

    pub const fn bits(&self) -> u16 {
        self.bits
    }

    /// Set one button; returns `false` if the layout has no such button.
    pub fn set(&mut self, button: Button, pressed: bool) -> bool {
        let Some(index) = self.layout.index_of(button) else {
            return false;
        };
        if pressed {
            self.bits |= 1 << index;
        } else {
            self.bits &= !(1 << index);
        }
        true
    }

    /// `true` if `button` is part of the layout and pressed.
    pub fn is_pressed(&self, button: Button) -> bool {
        self.layout
            .index_of(button)
            .is_some_and(|index| self.bits & (1 << index) != 0)
    }

    /// `(button, pressed)` pairs in layout order.
    pub fn states(&self) -> impl Iterator<Item = (Button, bool)> + '_ {
        self.layout
            .buttons()
            .iter()
            .enumerate()
            .map(|(i, &button)| (button, self.bits & (1 << i) != 0))
    }

    /// Buttons currently pressed, in layout order.
    pub fn pressed(&self) -> impl Iterator<Item = Button> + '_ {
        self.states()
            .filter_map(|(button, pressed)| pressed.then_some(button))
    }

    pub const fn is_idle(&self) -> bool {
        self.bits == 0
    }

    /// Serialise into a byte slice for notification.
    /// Returns the number of bytes written, or 0 if `buf` is too small.
    pub fn serialize(&self, polarity: Polarity, buf: &mut [u8]) -> usize {
        let len = self.layout.wire_len();
        if buf.len() < len {
            return 0;
        }
        let wire = self.wire_bits(polarity).to_le_bytes();
        buf[..len].copy_from_slice(&wire[..len]);
        len
    }

    /// Parse a notification payload.
    ///
    /// Bytes past the layout's wire length, and bits past its button
    /// count, are ignored.
    pub fn from_wire(
        data: &[u8],
        layout: ButtonLayout,
        polarity: Polarity,
    ) -> Result<Self, DecodeError> {
        let expected = layout.wire_len();
        if data.len() < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: data.len(),
            });
        }
        let raw = data[..expected]
            .iter()
            .rev()
            .fold(0u16, |acc, &b| (acc << 8) | u16::from(b));
        Ok(Self::from_le_u16(raw, layout, polarity))
    }

    /// Decode an already-assembled little-endian bitfield (broadcast
    /// transport).
    pub const fn from_le_u16(raw: u16, layout: ButtonLayout, polarity: Polarity) -> Self {
        let bits = match polarity {
            Polarity::PressedHigh => raw,
            Polarity::PressedLow => !raw,
        };
        Self::from_bits(layout, bits)
    }

    fn wire_bits(&self, polarity: Polarity) -> u16 {
        match polarity {
            Polarity::PressedHigh => self.bits,
            Polarity::PressedLow => !self.bits & self.layout.mask(),
        }
    }
}
