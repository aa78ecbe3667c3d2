//! Button debouncing for the gamepad.
//!
//! Lines are polled every `SAMPLE_INTERVAL_MS`. A level change is accepted
//! only once the raw level has stayed the same for `BUTTON_DEBOUNCE_MS`;
//! shorter bounces never reach the frame.

use crate::codec::{ButtonFrame, ButtonLayout};
use crate::config::BUTTON_DEBOUNCE_MS;

/// Stable-interval debouncer for one line.
#[derive(Clone, Copy, Debug)]
pub struct Debouncer {
    stable: bool,
    candidate: bool,
    since: u64,
    interval_ms: u64,
}

impl Debouncer {
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            stable: false,
            candidate: false,
            since: 0,
            interval_ms,
        }
    }

    /// Feed one raw sample. Returns the new stable level when it changes.
    pub fn update(&mut self, raw: bool, now: u64) -> Option<bool> {
        if raw != self.candidate {
            self.candidate = raw;
            self.since = now;
        }
        if self.candidate != self.stable
            && now.saturating_sub(self.since) >= self.interval_ms
        {
            self.stable = self.candidate;
            return Some(self.stable);
        }
        None
    }

    pub const fn state(&self) -> bool {
        self.stable
    }
}

/// Most buttons any layout carries.
const MAX_LINES: usize = 16;

/// Debounces every button of a layout and tracks the resulting frame.
///
/// Pins are active-low (pull-up): a low level means pressed.
pub struct ButtonSampler {
    frame: ButtonFrame,
    lines: [Debouncer; MAX_LINES],
}

impl ButtonSampler {
    pub const fn new(layout: ButtonLayout) -> Self {
        Self::with_interval(layout, BUTTON_DEBOUNCE_MS)
    }

    pub const fn with_interval(layout: ButtonLayout, interval_ms: u64) -> Self {
        Self {
            frame: ButtonFrame::released(layout),
            lines: [Debouncer::new(interval_ms); MAX_LINES],
        }
    }

    /// Feed raw pin levels (`true` = high) in layout order.
    ///
    /// Returns the new frame if any debounced button changed. Extra levels
    /// are ignored; missing ones count as released.
    pub fn sample(&mut self, levels: &[bool], now: u64) -> Option<ButtonFrame> {
        let count = self.frame.layout().count();
        let mut bits = self.frame.bits();
        let mut changed = false;

        for (i, line) in self.lines.iter_mut().enumerate().take(count) {
            let pressed = levels.get(i).is_some_and(|&high| !high);
            if let Some(now_pressed) = line.update(pressed, now) {
                changed = true;
                if now_pressed {
                    bits |= 1 << i;
                } else {
                    bits &= !(1 << i);
                }
            }
        }

        if !changed {
            return None;
        }
        self.frame = ButtonFrame::from_bits(self.frame.layout(), bits);
        Some(self.frame)
    }

    /// Last debounced frame.
    pub fn frame(&self) -> ButtonFrame {
        self.frame
    }
}
