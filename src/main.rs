//! padlink console firmware - BLE central for up to `MAX_CONTROLLERS`
//! gamepads, with an SSD1306 status screen.

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::interrupt::Priority;
use embassy_nrf::{bind_interrupts, peripherals, twim};
use embassy_time::{Duration, Ticker};
use nrf_softdevice::{raw, Softdevice};
use padlink::ble::central::{self, INPUTS, LINK};
use padlink::config::{GAME_TICK_MS, MAX_CONTROLLERS};
use padlink::ui::display;
use padlink::Snapshot;
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

const DEVICE_NAME: &[u8] = b"padlink-console";

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("padlink console starting");

    let mut c = embassy_nrf::config::Config::default();
    c.gpiote_interrupt_priority = Priority::P2;
    c.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(c);

    let config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: MAX_CONTROLLERS as u8,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 0,
            periph_role_count: 0,
            central_role_count: MAX_CONTROLLERS as u8,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&config);
    unwrap!(spawner.spawn(softdevice_task(sd)));

    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());

    unwrap!(spawner.spawn(link_manager_task()));
    for worker in 0..MAX_CONTROLLERS {
        unwrap!(spawner.spawn(link_worker_task(sd, worker)));
    }
    unwrap!(spawner.spawn(scanner_task(sd)));
    unwrap!(spawner.spawn(display_task(i2c)));
    unwrap!(spawner.spawn(game_loop_task()));
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn scanner_task(sd: &'static Softdevice) -> ! {
    central::scanner_task(sd).await
}

#[embassy_executor::task]
async fn link_manager_task() -> ! {
    central::link_manager_task().await
}

#[embassy_executor::task(pool_size = MAX_CONTROLLERS)]
async fn link_worker_task(sd: &'static Softdevice, worker: usize) -> ! {
    central::link_worker_task(sd, worker).await
}

/// Redraw the status screen whenever a controller's state changes.
#[embassy_executor::task]
async fn display_task(i2c: twim::Twim<'static, peripherals::TWISPI0>) -> ! {
    let mut screen = display::init(i2c);
    let mut ticker = Ticker::every(Duration::from_millis(100));
    let mut shown: Option<(Snapshot, bool)> = None;

    loop {
        let snapshot = INPUTS.snapshot_all();
        let scanning = LINK.lock(|m| m.borrow().should_scan());
        if shown != Some((snapshot, scanning)) {
            display::draw_status(&mut screen, &snapshot, scanning);
            shown = Some((snapshot, scanning));
        }
        ticker.next().await;
    }
}

/// Stand-in game: polls every controller once per frame and logs what
/// changed.
#[embassy_executor::task]
async fn game_loop_task() -> ! {
    let mut ticker = Ticker::every(Duration::from_millis(GAME_TICK_MS));
    let mut previous = INPUTS.snapshot_all();

    loop {
        let current = INPUTS.snapshot_all();
        if current != previous {
            for (slot, frame) in current.iter() {
                if previous.frame(slot) != Some(frame) {
                    for button in frame.pressed() {
                        info!("Controller {}: {} pressed", slot.get(), button.name());
                    }
                }
            }
            previous = current;
        }
        ticker.next().await;
    }
}
