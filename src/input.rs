//! Controller input facade read by the game loop.
//!
//! Each slot is one `AtomicU32`:
//!
//! ```text
//! bit 31      connected
//! bits 16-17  layout code
//! bits 0-15   pressed bits (logical, bit i = button i)
//! ```
//!
//! A publish is a single store, so a reader never sees half of one frame
//! and half of another.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::codec::{Button, ButtonFrame, ButtonLayout};
use crate::config::MAX_CONTROLLERS;
use crate::link::SlotId;

const CONNECTED: u32 = 1 << 31;
const LAYOUT_SHIFT: u32 = 16;
const LAYOUT_MASK: u32 = 0b11;

fn pack(frame: ButtonFrame) -> u32 {
    CONNECTED | (u32::from(frame.layout().code()) << LAYOUT_SHIFT) | u32::from(frame.bits())
}

fn unpack(word: u32) -> Option<ButtonFrame> {
    if word & CONNECTED == 0 {
        return None;
    }
    let layout = ButtonLayout::from_code(((word >> LAYOUT_SHIFT) & LAYOUT_MASK) as u8)?;
    Some(ButtonFrame::from_bits(layout, word as u16))
}

/// Latest frame of every controller slot.
pub struct ControllerInputs<const N: usize = MAX_CONTROLLERS> {
    slots: [AtomicU32; N],
}

impl<const N: usize> ControllerInputs<N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU32::new(0) }; N],
        }
    }

    /// Mark `slot` connected with `frame` as its state. Ignored for slot
    /// ids past `N`.
    pub fn publish(&self, slot: SlotId, frame: ButtonFrame) {
        if let Some(cell) = self.slots.get(slot.index()) {
            cell.store(pack(frame), Ordering::Release);
        }
    }

    /// Mark `slot` disconnected; it reads as all-released from now on.
    pub fn clear(&self, slot: SlotId) {
        if let Some(cell) = self.slots.get(slot.index()) {
            cell.store(0, Ordering::Release);
        }
    }

    /// Current frame of `slot`, or `None` while nothing is connected there.
    pub fn snapshot(&self, slot: SlotId) -> Option<ButtonFrame> {
        let word = self.slots.get(slot.index())?.load(Ordering::Acquire);
        unpack(word)
    }

    pub fn is_connected(&self, slot: SlotId) -> bool {
        self.snapshot(slot).is_some()
    }

    /// `true` only if `slot` is connected and `button` is held.
    pub fn get_button_state(&self, slot: SlotId, button: Button) -> bool {
        self.snapshot(slot).is_some_and(|f| f.is_pressed(button))
    }

    /// Copy every slot at once, for one game tick.
    pub fn snapshot_all(&self) -> Snapshot<N> {
        let mut frames = [None; N];
        for (out, cell) in frames.iter_mut().zip(&self.slots) {
            *out = unpack(cell.load(Ordering::Acquire));
        }
        Snapshot { frames }
    }
}

impl<const N: usize> Default for ControllerInputs<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned copy of all controller states, handed to a game's update step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot<const N: usize = MAX_CONTROLLERS> {
    frames: [Option<ButtonFrame>; N],
}

impl<const N: usize> Snapshot<N> {
    pub fn frame(&self, slot: SlotId) -> Option<ButtonFrame> {
        self.frames.get(slot.index()).copied().flatten()
    }

    pub fn is_pressed(&self, slot: SlotId, button: Button) -> bool {
        self.frame(slot).is_some_and(|f| f.is_pressed(button))
    }

    pub fn is_connected(&self, slot: SlotId) -> bool {
        self.frame(slot).is_some()
    }

    pub fn connected_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }

    /// Connected slots with their frames, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, ButtonFrame)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.map(|f| (SlotId::from_index(i), f)))
    }
}
