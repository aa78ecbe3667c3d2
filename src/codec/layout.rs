use super::Button;

const EIGHT: [Button; 8] = [
    Button::Up,
    Button::Down,
    Button::Left,
    Button::Right,
    Button::A,
    Button::B,
    Button::X,
    Button::Y,
];

const TEN: [Button; 10] = [
    Button::Up,
    Button::Down,
    Button::Left,
    Button::Right,
    Button::A,
    Button::B,
    Button::X,
    Button::Y,
    Button::Back,
    Button::Start,
];

const ELEVEN: [Button; 11] = [
    Button::Left,
    Button::Right,
    Button::Up,
    Button::Down,
    Button::X,
    Button::Y,
    Button::A,
    Button::B,
    Button::M,
    Button::P,
    Button::Pause,
];

/// Fixed bit order of a gamepad variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonLayout {
    /// D-pad + A/B/X/Y.
    Eight,
    /// `Eight` + BACK/START.
    Ten,
    /// D-pad (LEFT first) + X/Y/A/B + M/P/PAUSE.
    Eleven,
}

impl ButtonLayout {
    /// Buttons in bit order.
    pub const fn buttons(self) -> &'static [Button] {
        match self {
            ButtonLayout::Eight => &EIGHT,
            ButtonLayout::Ten => &TEN,
            ButtonLayout::Eleven => &ELEVEN,
        }
    }

    /// Number of buttons (K).
    pub const fn count(self) -> usize {
        self.buttons().len()
    }

    /// Bytes on the wire, `ceil(K / 8)`.
    pub const fn wire_len(self) -> usize {
        self.count().div_ceil(8)
    }

    /// Bits that carry a button.
    pub const fn mask(self) -> u16 {
        ((1u32 << self.count()) - 1) as u16
    }

    /// Bit index of `button`, if this layout has it.
    pub fn index_of(self, button: Button) -> Option<usize> {
        self.buttons().iter().position(|&b| b == button)
    }

    /// Compact tag used when a layout has to fit in a few bits.
    pub(crate) const fn code(self) -> u8 {
        match self {
            ButtonLayout::Eight => 1,
            ButtonLayout::Ten => 2,
            ButtonLayout::Eleven => 3,
        }
    }

    pub(crate) const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ButtonLayout::Eight),
            2 => Some(ButtonLayout::Ten),
            3 => Some(ButtonLayout::Eleven),
            _ => None,
        }
    }
}
