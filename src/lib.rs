//! padlink - wireless gamepad link for nRF52840 handheld consoles.
//!
//! The pure protocol logic (codec, debouncer, link manager, notifier,
//! broadcast receiver, input facade) builds for the host so it can be
//! tested with a plain `cargo test`. The SoftDevice/Embassy glue and the
//! display only build with the `embedded` feature, which the two
//! firmware binaries require:
//!
//! - `padlink-console` (`src/main.rs`): BLE central, up to
//!   `MAX_CONTROLLERS` gamepads.
//! - `padlink-gamepad` (`src/bin/gamepad.rs`): BLE peripheral.

#![cfg_attr(not(test), no_std)]

// The radio and UI glue only builds for the target and logs through
// `defmt` directly, so it is declared ahead of the host logging shims.
pub mod ble;
#[cfg(feature = "embedded")]
pub mod ui;

#[macro_use]
mod fmt;

pub mod broadcast;
pub mod codec;
pub mod config;
pub mod debounce;
pub mod error;
pub mod input;
pub mod link;
pub mod notifier;

pub use codec::{Button, ButtonFrame, ButtonLayout, Polarity};
pub use config::LinkConfig;
pub use error::{ConnectError, DecodeError, Error};
pub use input::{ControllerInputs, Snapshot};
pub use link::{LinkIdentity, SlotId};

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module tests
// ═══════════════════════════════════════════════════════════════════════════
