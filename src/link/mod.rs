//! Central-side link management.
//!
//! Turns advertisements into subscribed controller slots:
//!
//! 1. **Queue** - advertisers of the game-controller service wait in a
//!    FIFO until the manager is free.
//! 2. **Manager** - runs at most one connection attempt at a time, with a
//!    time-bounded retry budget, and never blocks its caller.
//! 3. **Slots** - a subscribed peer owns a slot id (1..=N) and its
//!    connection handle until it disconnects.
//!
//! The manager is sans-IO: the firmware performs the radio work it asks
//! for (see `ble::central`) and reports the outcome back.

mod manager;
mod queue;
mod slots;


use core::fmt;

pub use manager::{AttemptVerdict, LinkAction, LinkManager, Rejected};
pub use queue::ConnectionQueue;
pub use slots::{ControllerSlot, SlotTable};

/// Stable hardware address of a peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkIdentity(pub [u8; 6]);

impl LinkIdentity {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for LinkIdentity {
    /// Most significant byte first, as printed on labels.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[5], b[4], b[3], b[2], b[1], b[0]
        )
    }
}

/// Logical controller number, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotId(u8);

impl SlotId {
    /// `None` for 0.
    pub const fn new(id: u8) -> Option<Self> {
        if id == 0 {
            None
        } else {
            Some(Self(id))
        }
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index as u8 + 1)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based array index.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}
