//! Gamepad button sampling.
//!
//! Every button is active-low with an internal pull-up. The lines are
//! polled every `SAMPLE_INTERVAL_MS`, debounced by [`ButtonSampler`] and
//! each changed frame is signalled to the BLE task.

use crate::codec::{ButtonFrame, ButtonLayout};
use crate::config::SAMPLE_INTERVAL_MS;
use crate::debounce::ButtonSampler;
use defmt::{debug, info};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker};

/// Poll `pins` (in `layout` order) forever.
pub async fn sampling_task<const P: usize>(
    pins: [AnyPin; P],
    layout: ButtonLayout,
    frames: &'static Signal<CriticalSectionRawMutex, ButtonFrame>,
) -> ! {
    let inputs = pins.map(|pin| Input::new(pin, Pull::Up));
    let mut sampler = ButtonSampler::new(layout);
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let mut levels = [true; P];

    info!("Sampling {} buttons", layout.count());
    loop {
        for (level, input) in levels.iter_mut().zip(&inputs) {
            *level = input.is_high();
        }
        if let Some(frame) = sampler.sample(&levels, Instant::now().as_millis()) {
            debug!("Buttons: {:#x}", frame.bits());
            frames.signal(frame);
        }
        ticker.next().await;
    }
}
