//! Unit tests for frame packing and decoding.
//!
//! These tests run on the host (not embedded) and verify the bit layout
//! both firmware images rely on.

use super::{Button, ButtonFrame, ButtonLayout, Polarity};
use crate::error::DecodeError;

const LAYOUTS: [ButtonLayout; 3] = [ButtonLayout::Eight, ButtonLayout::Ten, ButtonLayout::Eleven];
const POLARITIES: [Polarity; 2] = [Polarity::PressedHigh, Polarity::PressedLow];

fn states_of(layout: ButtonLayout, bits: u16) -> heapless::Vec<bool, 16> {
    (0..layout.count()).map(|i| bits & (1 << i) != 0).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Layout
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn layout_counts_and_wire_lengths() {
    assert_eq!(ButtonLayout::Eight.count(), 8);
    assert_eq!(ButtonLayout::Eight.wire_len(), 1);
    assert_eq!(ButtonLayout::Ten.count(), 10);
    assert_eq!(ButtonLayout::Ten.wire_len(), 2);
    assert_eq!(ButtonLayout::Eleven.count(), 11);
    assert_eq!(ButtonLayout::Eleven.wire_len(), 2);
}

#[test]
fn layout_masks_cover_only_defined_buttons() {
    assert_eq!(ButtonLayout::Eight.mask(), 0x00FF);
    assert_eq!(ButtonLayout::Ten.mask(), 0x03FF);
    assert_eq!(ButtonLayout::Eleven.mask(), 0x07FF);
}

#[test]
fn eleven_button_order_starts_with_left() {
    let layout = ButtonLayout::Eleven;
    assert_eq!(layout.index_of(Button::Left), Some(0));
    assert_eq!(layout.index_of(Button::Up), Some(2));
    assert_eq!(layout.index_of(Button::A), Some(6));
    assert_eq!(layout.index_of(Button::Pause), Some(10));
    assert_eq!(layout.index_of(Button::Start), None);
}

#[test]
fn ten_button_order_extends_eight() {
    let eight = ButtonLayout::Eight.buttons();
    let ten = ButtonLayout::Ten.buttons();
    assert_eq!(&ten[..8], eight);
    assert_eq!(ten[8], Button::Back);
    assert_eq!(ten[9], Button::Start);
}

#[test]
fn layout_code_roundtrip() {
    for layout in LAYOUTS {
        assert_eq!(ButtonLayout::from_code(layout.code()), Some(layout));
    }
    assert_eq!(ButtonLayout::from_code(0), None);
}

// ═══════════════════════════════════════════════════════════════════════════
// Encode / decode
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn up_and_a_on_eight_button_layout() {
    let frame = ButtonFrame::from_pressed(ButtonLayout::Eight, &[Button::Up, Button::A]);
    let mut buf = [0u8; 2];
    let len = frame.serialize(Polarity::PressedHigh, &mut buf);
    assert_eq!(len, 1);
    assert_eq!(buf[0], 0b0001_0001);

    let decoded =
        ButtonFrame::from_wire(&buf[..len], ButtonLayout::Eight, Polarity::PressedHigh).unwrap();
    for (button, pressed) in decoded.states() {
        assert_eq!(pressed, matches!(button, Button::Up | Button::A), "{:?}", button);
    }
}

#[test]
fn every_state_vector_roundtrips() {
    for layout in LAYOUTS {
        for polarity in POLARITIES {
            for bits in 0..=layout.mask() {
                let states = states_of(layout, bits);
                let frame = ButtonFrame::from_states(layout, &states).unwrap();

                let mut buf = [0u8; 2];
                let len = frame.serialize(polarity, &mut buf);
                assert_eq!(len, layout.wire_len());

                let decoded = ButtonFrame::from_wire(&buf[..len], layout, polarity).unwrap();
                assert_eq!(decoded, frame);
                let back: heapless::Vec<bool, 16> = decoded.states().map(|(_, p)| p).collect();
                assert_eq!(back, states);
            }
        }
    }
}

#[test]
fn undefined_bits_stay_zero_on_the_wire() {
    for polarity in POLARITIES {
        let frame = ButtonFrame::released(ButtonLayout::Eleven);
        let mut buf = [0u8; 2];
        frame.serialize(polarity, &mut buf);
        assert_eq!(buf[1] & !0b0000_0111, 0);

        let frame = ButtonFrame::from_bits(ButtonLayout::Eleven, 0xFFFF);
        frame.serialize(polarity, &mut buf);
        assert_eq!(buf[1] & !0b0000_0111, 0);
    }
}

#[test]
fn pressed_low_inverts_defined_bits_only() {
    let frame = ButtonFrame::from_pressed(ButtonLayout::Ten, &[Button::Up, Button::Start]);
    let mut buf = [0u8; 2];
    frame.serialize(Polarity::PressedLow, &mut buf);
    assert_eq!(buf, [0b1111_1110, 0b0000_0001]);
}

#[test]
fn truncated_payload_is_rejected() {
    assert_eq!(
        ButtonFrame::from_wire(&[], ButtonLayout::Eight, Polarity::PressedHigh),
        Err(DecodeError::Truncated {
            expected: 1,
            actual: 0
        })
    );
    assert_eq!(
        ButtonFrame::from_wire(&[0xFF], ButtonLayout::Eleven, Polarity::PressedHigh),
        Err(DecodeError::Truncated {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn longer_payload_ignores_trailing_bytes() {
    let frame =
        ButtonFrame::from_wire(&[0x01, 0xFF, 0xAA], ButtonLayout::Eight, Polarity::PressedHigh)
            .unwrap();
    assert_eq!(frame.bits(), 0x01);
    assert!(frame.is_pressed(Button::Up));
}

#[test]
fn decode_masks_bits_past_button_count() {
    let frame =
        ButtonFrame::from_wire(&[0x00, 0xF8], ButtonLayout::Eleven, Polarity::PressedHigh).unwrap();
    assert!(frame.is_idle());
}

#[test]
fn serialize_buffer_too_small() {
    let frame = ButtonFrame::released(ButtonLayout::Eleven);
    let mut buf = [0u8; 1];
    assert_eq!(frame.serialize(Polarity::PressedHigh, &mut buf), 0);
}

#[test]
fn le_u16_matches_two_byte_wire() {
    let raw: u16 = 0b0000_0100_0100_0001; // LEFT, A, PAUSE
    let a = ButtonFrame::from_le_u16(raw, ButtonLayout::Eleven, Polarity::PressedHigh);
    let b = ButtonFrame::from_wire(&raw.to_le_bytes(), ButtonLayout::Eleven, Polarity::PressedHigh)
        .unwrap();
    assert_eq!(a, b);
    let pressed: heapless::Vec<Button, 11> = a.pressed().collect();
    assert_eq!(&pressed[..], &[Button::Left, Button::A, Button::Pause]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Frame helpers
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn from_states_requires_exact_length() {
    assert!(ButtonFrame::from_states(ButtonLayout::Eight, &[true; 7]).is_none());
    assert!(ButtonFrame::from_states(ButtonLayout::Eight, &[true; 9]).is_none());
    assert!(ButtonFrame::from_states(ButtonLayout::Eight, &[true; 8]).is_some());
}

#[test]
fn set_reports_missing_buttons() {
    let mut frame = ButtonFrame::released(ButtonLayout::Eight);
    assert!(!frame.set(Button::Pause, true));
    assert!(frame.is_idle());
    assert!(frame.set(Button::B, true));
    assert!(frame.is_pressed(Button::B));
    assert!(frame.set(Button::B, false));
    assert!(frame.is_idle());
}

#[test]
fn button_names_match_log_labels() {
    let names: heapless::Vec<&str, 11> = ButtonLayout::Eleven
        .buttons()
        .iter()
        .map(|b| b.name())
        .collect();
    assert_eq!(
        &names[..],
        &["LEFT", "RIGHT", "UP", "DOWN", "X", "Y", "A", "B", "M", "P", "PAUSE"]
    );
}
