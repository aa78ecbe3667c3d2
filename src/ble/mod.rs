//! Bluetooth Low Energy subsystem.
//!
//! The console drives the Nordic SoftDevice S140 in **Central** role:
//!
//! 1. **Scanner** - feeds advertisements of the game-controller service
//!    into the link manager while a slot is free.
//! 2. **Link workers** - make the connect tries the manager asks for,
//!    discover the service, enable notifications and then run the
//!    notification loop of the slot they obtained.
//! 3. **Manager task** - ticks the link manager on a timer and hands
//!    connect requests to an idle worker.
//!
//! The gamepad runs the **Peripheral** role (`peripheral`): GATT server,
//! advertising and the notify loop.
//!
//! Only `adv_parser` is compiled for host tests.

pub mod adv_parser;

#[cfg(feature = "embedded")]
pub mod central;
#[cfg(feature = "embedded")]
pub mod pad_client;
#[cfg(feature = "embedded")]
pub mod peripheral;
