//! Application-wide constants and compile-time configuration.
//!
//! All protocol identifiers, timing parameters, and pin assignments live
//! here so both firmware images (console and gamepad) agree on them.

use crate::codec::{ButtonLayout, Polarity};

// GATT identifiers

/// Game-controller service UUID, `00bf47c4-f07e-48d3-819f-4beafd84477c`.
///
/// The notify-only button characteristic under it,
/// `3239a287-250a-40b8-92a7-8af2b3239bb7`, is only named in the GATT
/// macros of `ble::peripheral` and `ble::pad_client`.
pub const SERVICE_UUID: u128 = 0x00bf47c4_f07e_48d3_819f_4beafd84477c;

/// Service UUID in advertisement (little-endian) byte order.
pub const SERVICE_UUID_LE: [u8; 16] = SERVICE_UUID.to_le_bytes();

// Link management

/// Maximum number of controllers the console binds at once.
pub const MAX_CONTROLLERS: usize = 2;

/// Discovered-but-not-connected peers we keep around.
pub const CONNECTION_QUEUE_CAPACITY: usize = 8;

/// Overall budget for one connection attempt, retries included (ms).
pub const CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Pause between two connect tries of the same attempt (ms).
pub const CONNECT_RETRY_INTERVAL_MS: u64 = 1_000;

/// Manager housekeeping period when nothing wakes it earlier (ms).
pub const LINK_TICK_MS: u64 = 100;

// BLE (central)

/// Duration of a BLE scan window (seconds).
pub const BLE_SCAN_DURATION_SECS: u64 = 10;

/// Scan interval / window (in 0.625 ms units). 800 = 500 ms, 798 ≈ 499 ms.
pub const BLE_SCAN_INTERVAL: u32 = 800;
pub const BLE_SCAN_WINDOW: u32 = 798;

/// Idle wait before checking again whether a rescan is needed (seconds).
pub const BLE_RESCAN_BACKOFF_SECS: u64 = 1;

/// BLE connection interval range (in 1.25 ms units).
/// 6 = 7.5 ms, low latency for button traffic.
pub const BLE_CONN_INTERVAL_MIN: u16 = 6;
pub const BLE_CONN_INTERVAL_MAX: u16 = 12;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

// BLE (gamepad)

/// Advertising interval (in 0.625 ms units). 400 = 250 ms.
pub const BLE_ADV_INTERVAL: u32 = 400;

/// Name carried in the scan response. Build the second gamepad with
/// `--features player2`.
#[cfg(not(feature = "player2"))]
pub const GAMEPAD_NAME: &str = "GameController_P1";
#[cfg(feature = "player2")]
pub const GAMEPAD_NAME: &str = "GameController_P2";

/// Notification attempts for one frame before giving up.
pub const SEND_MAX_ATTEMPTS: u8 = 3;

/// Pause between two notification attempts (ms).
pub const SEND_RETRY_DELAY_MS: u64 = 100;

// Buttons

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 25;

/// Button sampling period (ms).
pub const SAMPLE_INTERVAL_MS: u64 = 10;

// GPIO pin assignments (gamepad board)
//
// Logical names in `ButtonLayout::Eleven` order; the concrete
// `embassy_nrf::peripherals::*` pins are bound in `bin/gamepad.rs`.
// All buttons are active-low with internal pull-up.
//
//   LEFT  → P0.13    RIGHT → P0.11    UP    → P0.16    DOWN  → P0.12
//   X     → P0.03    Y     → P0.04    A     → P0.02    B     → P0.28
//   M     → P0.29    P     → P0.30    PAUSE → P0.31
//
// Console status display:
//   I²C SDA → P0.26, I²C SCL → P0.27

// Game loop

/// Console game-loop period (ms), roughly 60 Hz.
pub const GAME_TICK_MS: u64 = 16;

/// Runtime selection of the frame codec variant and link timings.
///
/// Both roles must agree on `layout` and `polarity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub layout: ButtonLayout,
    pub polarity: Polarity,
    pub connect_timeout_ms: u64,
    pub retry_interval_ms: u64,
}

impl LinkConfig {
    /// Eleven-button gamepad, bit set = pressed.
    pub const fn new() -> Self {
        Self {
            layout: ButtonLayout::Eleven,
            polarity: Polarity::PressedHigh,
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            retry_interval_ms: CONNECT_RETRY_INTERVAL_MS,
        }
    }

    pub const fn with_layout(mut self, layout: ButtonLayout) -> Self {
        self.layout = layout;
        self
    }

    pub const fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    pub const fn with_timeouts(mut self, connect_timeout_ms: u64, retry_interval_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self.retry_interval_ms = retry_interval_ms;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gamepad_name_fits_the_scan_response() {
        // 31-byte payload minus the AD length and type bytes.
        assert!(GAMEPAD_NAME.len() <= 29);
        let player = if cfg!(feature = "player2") { "_P2" } else { "_P1" };
        assert!(GAMEPAD_NAME.ends_with(player));
    }

    #[test]
    fn service_uuid_is_little_endian_on_air() {
        assert_eq!(SERVICE_UUID_LE[0], 0x7c);
        assert_eq!(SERVICE_UUID_LE[15], 0x00);
    }
}
