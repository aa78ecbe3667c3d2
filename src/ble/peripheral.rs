//! Gamepad-side BLE: GATT server, advertising and the notify loop.
//!
//! Debounced frames arrive through [`FRAMES`] and CCCD writes through
//! [`SUBSCRIPTION`]; the [`Notifier`] decides which frames go out and
//! when a failed notification is retried.

use crate::ble::adv_parser::{build_adv_data, build_scan_data};
use crate::codec::{ButtonFrame, MAX_WIRE_LEN};
use crate::config::{self, LinkConfig, SERVICE_UUID_LE};
use crate::notifier::{Notifier, SendVerdict};
use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use heapless::Vec;
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::Softdevice;

/// Latest debounced frame from the sampling task.
pub static FRAMES: Signal<CriticalSectionRawMutex, ButtonFrame> = Signal::new();

/// Notifications enabled (`true`) or disabled by the central.
static SUBSCRIPTION: Signal<CriticalSectionRawMutex, bool> = Signal::new();

#[nrf_softdevice::gatt_service(uuid = "00bf47c4-f07e-48d3-819f-4beafd84477c")]
pub struct PadService {
    /// Packed button frame. Notify only.
    #[characteristic(uuid = "3239a287-250a-40b8-92a7-8af2b3239bb7", notify)]
    pub buttons: Vec<u8, MAX_WIRE_LEN>,
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub pad: PadService,
}

enum PadEvent {
    Frame(ButtonFrame),
    Subscription(bool),
}

async fn next_event() -> PadEvent {
    match select(FRAMES.wait(), SUBSCRIPTION.wait()).await {
        Either::First(frame) => PadEvent::Frame(frame),
        Either::Second(enabled) => PadEvent::Subscription(enabled),
    }
}

/// Advertise, serve one central at a time, restart advertising on
/// disconnect.
pub async fn gamepad_task(sd: &'static Softdevice, server: &Server, link: LinkConfig) -> ! {
    let adv_data = build_adv_data(&SERVICE_UUID_LE);
    let scan_data = build_scan_data(config::GAMEPAD_NAME);
    let adv_config = peripheral::Config {
        interval: config::BLE_ADV_INTERVAL,
        ..Default::default()
    };

    let mut notifier = Notifier::new();
    // Last debounced frame, so a new central gets the current state.
    let mut current = ButtonFrame::released(link.layout);

    loop {
        info!("Advertising as {}", config::GAMEPAD_NAME);
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data,
            scan_data: &scan_data,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &adv_config).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising failed: {}", e);
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        info!("Central connected");
        SUBSCRIPTION.reset();
        notifier.on_connected();

        let serve = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Pad(PadServiceEvent::ButtonsCccdWrite { notifications }) => {
                info!("Button notifications {}", if notifications { "on" } else { "off" });
                SUBSCRIPTION.signal(notifications);
            }
        });
        let push = notify_loop(&conn, server, link, &mut notifier, &mut current);
        // `notify_loop` never returns; `serve` ends when the link drops.
        let _ = select(serve, push).await;

        info!("Central disconnected");
        notifier.on_disconnected();
    }
}

fn apply(notifier: &mut Notifier, current: &mut ButtonFrame, event: PadEvent) -> Option<ButtonFrame> {
    match event {
        PadEvent::Frame(frame) => {
            *current = frame;
            notifier.on_buttons_changed(frame)
        }
        PadEvent::Subscription(true) => {
            if let Some(frame) = FRAMES.try_take() {
                *current = frame;
            }
            notifier.on_subscribed(*current)
        }
        PadEvent::Subscription(false) => {
            notifier.on_unsubscribed();
            None
        }
    }
}

async fn notify_loop(
    conn: &Connection,
    server: &Server,
    link: LinkConfig,
    notifier: &mut Notifier,
    current: &mut ButtonFrame,
) -> ! {
    let mut outgoing = None;

    loop {
        let Some(frame) = outgoing.take() else {
            let event = next_event().await;
            outgoing = apply(notifier, current, event);
            continue;
        };

        let mut buf = [0u8; MAX_WIRE_LEN];
        let len = frame.serialize(link.polarity, &mut buf);
        let value: Vec<u8, MAX_WIRE_LEN> = Vec::from_slice(&buf[..len]).unwrap_or_default();

        match server.pad.buttons_notify(conn, &value) {
            Ok(()) => notifier.on_send_ok(),
            Err(_) => {
                if let SendVerdict::Retry(frame) = notifier.on_send_failed() {
                    // A newer frame or a CCCD change wins over the retry.
                    let delay = Timer::after(Duration::from_millis(config::SEND_RETRY_DELAY_MS));
                    match select(delay, next_event()).await {
                        Either::First(()) => outgoing = Some(frame),
                        Either::Second(event) => {
                            outgoing = apply(notifier, current, event).or(notifier.pending());
                        }
                    }
                }
            }
        }
    }
}
