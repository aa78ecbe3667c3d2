//! GATT client for the game-controller service.
//!
//! After the GAP connection is up this module:
//! 1. Discovers the game-controller service.
//! 2. Finds the button-state characteristic.
//! 3. Enables its CCCD so every frame change is notified.
//! 4. Hands each notification to the link manager until the link drops.

use crate::codec::MAX_WIRE_LEN;
use crate::error::ConnectError;
use crate::input::ControllerInputs;
use crate::link::SlotId;
use defmt::{info, warn};
use nrf_softdevice::ble::gatt_client::{self, DiscoverError};
use nrf_softdevice::ble::Connection;

use super::central::SharedLink;

/// Generated helpers: `discover`, `buttons_cccd_write` and the
/// `PadServiceClientEvent` notification enum.
#[nrf_softdevice::gatt_client(uuid = "00bf47c4-f07e-48d3-819f-4beafd84477c")]
pub struct PadServiceClient {
    /// Packed button frame, 1 or 2 bytes depending on the layout.
    #[characteristic(uuid = "3239a287-250a-40b8-92a7-8af2b3239bb7", notify)]
    pub buttons: heapless::Vec<u8, MAX_WIRE_LEN>,
}

/// Discover the service and subscribe to button notifications.
pub async fn discover_and_subscribe(conn: &Connection) -> Result<PadServiceClient, ConnectError> {
    let client: PadServiceClient = gatt_client::discover(conn).await.map_err(|e| match e {
        DiscoverError::ServiceIncomplete => ConnectError::CharacteristicNotFound,
        _ => ConnectError::ServiceNotFound,
    })?;
    info!("Controller service discovered");

    client
        .buttons_cccd_write(true)
        .await
        .map_err(|_| ConnectError::NotifyUnsupported)?;

    info!("Subscribed to button notifications");
    Ok(client)
}

/// Decode every notification into `slot` and publish it until the
/// connection closes.
pub async fn run_notification_loop(
    conn: &Connection,
    client: &PadServiceClient,
    slot: SlotId,
    link: &SharedLink,
    inputs: &ControllerInputs,
) {
    info!("Player {} notification loop started", slot.get());

    let _ = gatt_client::run(conn, client, |event| match event {
        PadServiceClientEvent::ButtonsNotification(data) => {
            let decoded = link.lock(|m| m.borrow_mut().on_notification(slot, &data));
            match decoded {
                Ok(frame) => inputs.publish(slot, frame),
                Err(e) => warn!("Player {}: frame dropped ({})", slot.get(), e),
            }
        }
    })
    .await;

    info!("Player {} notification loop ended", slot.get());
}
