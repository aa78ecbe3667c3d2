//! padlink gamepad firmware - BLE peripheral that notifies debounced
//! button frames to the console.

#![no_std]
#![no_main]

use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::interrupt::Priority;
use nrf_softdevice::{raw, Softdevice};
use padlink::ble::peripheral::{self, Server, FRAMES};
use padlink::config::GAMEPAD_NAME;
use padlink::ui::buttons;
use padlink::LinkConfig;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

/// Must match the console's link configuration.
const GAMEPAD_LINK: LinkConfig = LinkConfig::new();

const BUTTON_COUNT: usize = 11;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("padlink gamepad starting");

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
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: GAMEPAD_NAME.as_ptr() as _,
            current_len: GAMEPAD_NAME.len() as u16,
            max_len: GAMEPAD_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&config);
    static SERVER: StaticCell<Server> = StaticCell::new();
    let server = SERVER.init(unwrap!(Server::new(sd)));
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // `ButtonLayout::Eleven` order, see the pin map in `config`.
    let pins: [AnyPin; BUTTON_COUNT] = [
        p.P0_13.degrade(), // LEFT
        p.P0_11.degrade(), // RIGHT
        p.P0_16.degrade(), // UP
        p.P0_12.degrade(), // DOWN
        p.P0_03.degrade(), // X
        p.P0_04.degrade(), // Y
        p.P0_02.degrade(), // A
        p.P0_28.degrade(), // B
        p.P0_29.degrade(), // M
        p.P0_30.degrade(), // P
        p.P0_31.degrade(), // PAUSE
    ];

    unwrap!(spawner.spawn(sampling_task(pins)));
    unwrap!(spawner.spawn(ble_task(sd, server)));
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn sampling_task(pins: [AnyPin; BUTTON_COUNT]) -> ! {
    buttons::sampling_task(pins, GAMEPAD_LINK.layout, &FRAMES).await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    peripheral::gamepad_task(sd, server, GAMEPAD_LINK).await
}
