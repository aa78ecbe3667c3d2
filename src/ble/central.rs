//! Console-side BLE tasks: scanner, link manager and link workers.
//!
//! All three share one [`LinkManager`] behind a critical-section mutex.
//! The manager never touches the radio itself; connect requests travel
//! to the workers over `ATTEMPTS` and the outcome is reported back under
//! the same lock.

use core::cell::RefCell;

use crate::ble::adv_parser::extract_device_name;
use crate::ble::pad_client;
use crate::codec::ButtonFrame;
use crate::config::{self, LinkConfig};
use crate::error::ConnectError;
use crate::input::ControllerInputs;
use crate::link::{AttemptVerdict, LinkAction, LinkIdentity, LinkManager};
use defmt::{info, warn};
use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use nrf_softdevice::ble::{central, Address, AddressType, Connection};
use nrf_softdevice::raw;
use nrf_softdevice::Softdevice;

pub type SharedLink = Mutex<CriticalSectionRawMutex, RefCell<LinkManager<Connection>>>;

/// Link configuration of the console. Both images must agree on it.
pub const CONSOLE_LINK: LinkConfig = LinkConfig::new();

/// Connection queue and controller slots.
pub static LINK: SharedLink = Mutex::new(RefCell::new(LinkManager::new(CONSOLE_LINK)));

/// Latest frame of every slot, read by the game loop and the display.
pub static INPUTS: ControllerInputs = ControllerInputs::new();

/// Wakes the manager task early (queue grew, attempt ended, slot freed).
static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Connect requests for the link workers.
static ATTEMPTS: Channel<CriticalSectionRawMutex, LinkIdentity, 1> = Channel::new();

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Scan while a slot is free and no attempt is running.
///
/// The SoftDevice has a single scanner and `central::connect` needs it,
/// so a scan window ends on the report following the one that queued a
/// new controller. Scanning is active, so that report is usually the
/// controller's scan response with its name.
pub async fn scanner_task(sd: &'static Softdevice) -> ! {
    loop {
        let idle = LINK.lock(|m| {
            let m = m.borrow();
            m.should_scan() && !m.is_connecting() && m.queued() == 0
        });
        if !idle {
            Timer::after(Duration::from_secs(config::BLE_RESCAN_BACKOFF_SECS)).await;
            continue;
        }

        info!("BLE scan starting ({} s window)", config::BLE_SCAN_DURATION_SECS);
        let scan_config = central::ScanConfig {
            active: true,
            interval: config::BLE_SCAN_INTERVAL,
            window: config::BLE_SCAN_WINDOW,
            ..Default::default()
        };

        let mut queued: Option<LinkIdentity> = None;
        let scan = central::scan(sd, &scan_config, |params| {
            let data = unsafe {
                core::slice::from_raw_parts(params.data.p_data, params.data.len as usize)
            };
            let peer = LinkIdentity::new(params.peer_addr.addr);
            if let Some(waiting) = queued {
                if waiting == peer {
                    info!("Found: {} (RSSI {})", extract_device_name(data).as_str(), params.rssi);
                }
                // Stop so the manager can use the scanner for the connection.
                return Some(());
            }
            if LINK.lock(|m| m.borrow_mut().on_advertisement_data(peer, data)) {
                queued = Some(peer);
            }
            None
        });

        match with_timeout(Duration::from_secs(config::BLE_SCAN_DURATION_SECS), scan).await {
            Ok(Ok(())) => WAKE.signal(()),
            Ok(Err(_)) => {
                warn!("BLE scan ended with error");
                Timer::after(Duration::from_secs(config::BLE_RESCAN_BACKOFF_SECS)).await;
            }
            Err(_) => info!("BLE scan window closed"),
        }
    }
}

/// Drive the link manager: emit connect requests and retries on time.
pub async fn link_manager_task() -> ! {
    loop {
        let now = now_ms();
        let action = LINK.lock(|m| m.borrow_mut().tick(now));
        match action {
            Some(LinkAction::Connect(peer)) => {
                ATTEMPTS.send(peer).await;
                continue;
            }
            Some(LinkAction::GaveUp { peer, error }) => {
                warn!("Gave up on controller {}: {}", peer, error);
                continue;
            }
            None => {}
        }

        let wake_at = LINK
            .lock(|m| m.borrow().next_wakeup())
            .unwrap_or(now + config::LINK_TICK_MS);
        select(WAKE.wait(), Timer::at(Instant::from_millis(wake_at))).await;
    }
}

/// One link worker. Spawn `MAX_CONTROLLERS` of them.
///
/// Each request is a single connect try. On success the worker keeps the
/// connection and runs its notification loop until the controller drops.
pub async fn link_worker_task(sd: &'static Softdevice, worker: usize) -> ! {
    loop {
        let peer = ATTEMPTS.receive().await;
        let deadline = LINK
            .lock(|m| m.borrow().attempt_deadline())
            .unwrap_or(now_ms());
        info!("Worker {} connecting to {}", worker, peer);

        match connect_and_subscribe(sd, peer, deadline).await {
            Ok((conn, client)) => run_slot(peer, conn, client).await,
            Err(error) => {
                let now = now_ms();
                let verdict = LINK.lock(|m| m.borrow_mut().on_attempt_failed(now, peer, error));
                if let AttemptVerdict::Abandoned(reason) = verdict {
                    warn!("Controller {} abandoned: {}", peer, reason);
                }
            }
        }
        WAKE.signal(());
    }
}

async fn run_slot(peer: LinkIdentity, conn: Connection, client: pad_client::PadServiceClient) {
    let now = now_ms();
    let subscribed = LINK.lock(|m| m.borrow_mut().on_subscribed(now, peer, conn.clone()));
    let slot = match subscribed {
        Ok(slot) => slot,
        Err(rejected) => {
            warn!("Controller {} rejected: {}", peer, rejected.reason);
            let _ = rejected.handle.disconnect();
            return;
        }
    };

    INPUTS.publish(slot, ButtonFrame::released(CONSOLE_LINK.layout));
    WAKE.signal(());

    pad_client::run_notification_loop(&conn, &client, slot, &LINK, &INPUTS).await;

    INPUTS.clear(slot);
    // The link is already gone; dropping the slot releases our handle.
    let _ = LINK.lock(|m| m.borrow_mut().on_disconnect(slot));
}

/// One connect try, then discovery and subscription, all before
/// `deadline`. Anything acquired is released before an error is returned.
async fn connect_and_subscribe(
    sd: &'static Softdevice,
    peer: LinkIdentity,
    deadline: u64,
) -> Result<(Connection, pad_client::PadServiceClient), ConnectError> {
    let remaining = deadline.saturating_sub(now_ms());
    if remaining == 0 {
        return Err(ConnectError::ConnectFailed);
    }

    // Gamepads advertise with the SoftDevice default random static address.
    let address = Address::new(AddressType::RandomStatic, peer.bytes());
    let whitelist = [&address];
    let conn_cfg = central::ConnectConfig {
        scan_config: central::ScanConfig {
            whitelist: Some(&whitelist),
            ..Default::default()
        },
        conn_params: raw::ble_gap_conn_params_t {
            min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
            max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
            slave_latency: config::BLE_SLAVE_LATENCY,
            conn_sup_timeout: config::BLE_SUP_TIMEOUT,
        },
        ..Default::default()
    };

    let connect = central::connect(sd, &conn_cfg);
    let conn = match with_timeout(Duration::from_millis(remaining), connect).await {
        Ok(Ok(conn)) => conn,
        Ok(Err(_)) | Err(_) => return Err(ConnectError::ConnectFailed),
    };

    let remaining = deadline.saturating_sub(now_ms());
    let discover = pad_client::discover_and_subscribe(&conn);
    let subscribed = match with_timeout(Duration::from_millis(remaining), discover).await {
        Ok(result) => result,
        Err(_) => Err(ConnectError::Timeout),
    };
    if subscribed.is_err() {
        let _ = conn.disconnect();
    }
    subscribed.map(|client| (conn, client))
}
