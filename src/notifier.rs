//! Peripheral-side notification state machine.
//!
//! ```text
//! Advertising ──connected──▶ Connected ──subscribed──▶ Idle ──frame changed──▶ Sending
//!      ▲                        ▲                        ▲                        │
//!      │                        └─────unsubscribed───────┤◀──sent / gave up───────┘
//!      └──────────────────── disconnected (any state) ───────────────────────────┘
//! ```
//!
//! Nothing is sent until the central has enabled notifications; the
//! current frame goes out once as soon as it does. The firmware owns the
//! radio; this type only decides what to send and when to retry.

use crate::codec::ButtonFrame;
use crate::config::SEND_MAX_ATTEMPTS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralState {
    /// No central; the firmware advertises.
    Advertising,
    /// A central is connected but has not enabled notifications.
    Connected,
    /// Connected, nothing pending.
    Idle,
    /// A notification is in flight.
    Sending,
}

/// What to do after a failed notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendVerdict {
    /// Send the same frame again after `SEND_RETRY_DELAY_MS`.
    Retry(ButtonFrame),
    /// Attempt limit reached; the frame is dropped.
    GiveUp,
}

pub struct Notifier {
    state: PeripheralState,
    last_sent: Option<ButtonFrame>,
    pending: Option<ButtonFrame>,
    attempts: u8,
    max_attempts: u8,
}

impl Notifier {
    pub const fn new() -> Self {
        Self::with_max_attempts(SEND_MAX_ATTEMPTS)
    }

    pub const fn with_max_attempts(max_attempts: u8) -> Self {
        Self {
            state: PeripheralState::Advertising,
            last_sent: None,
            pending: None,
            attempts: 0,
            max_attempts,
        }
    }

    pub fn state(&self) -> PeripheralState {
        self.state
    }

    pub fn last_sent(&self) -> Option<ButtonFrame> {
        self.last_sent
    }

    /// Frame currently being sent or retried.
    pub fn pending(&self) -> Option<ButtonFrame> {
        self.pending
    }

    /// A central connected. Frames are held back until it subscribes.
    pub fn on_connected(&mut self) {
        self.state = PeripheralState::Connected;
        self.last_sent = None;
        self.pending = None;
        self.attempts = 0;
    }

    /// The central enabled notifications. Returns `current` to send, even
    /// if it matches what an earlier subscription saw.
    pub fn on_subscribed(&mut self, current: ButtonFrame) -> Option<ButtonFrame> {
        if self.state == PeripheralState::Advertising {
            return None;
        }
        self.state = PeripheralState::Idle;
        self.last_sent = None;
        self.pending = None;
        self.attempts = 0;
        self.on_buttons_changed(current)
    }

    /// The central disabled notifications; any in-flight send is dropped.
    pub fn on_unsubscribed(&mut self) {
        if self.state == PeripheralState::Advertising {
            return;
        }
        self.state = PeripheralState::Connected;
        self.pending = None;
        self.attempts = 0;
    }

    /// Link lost; any in-flight send is abandoned.
    pub fn on_disconnected(&mut self) {
        if self.pending.is_some() {
            debug!("Send abandoned on disconnect");
        }
        self.state = PeripheralState::Advertising;
        self.pending = None;
        self.attempts = 0;
    }

    /// The debounced frame changed. Returns the frame to send, if any.
    ///
    /// A newer frame replaces one still being retried.
    pub fn on_buttons_changed(&mut self, frame: ButtonFrame) -> Option<ButtonFrame> {
        let subscribed = matches!(
            self.state,
            PeripheralState::Idle | PeripheralState::Sending
        );
        if !subscribed || self.pending == Some(frame) {
            return None;
        }
        if self.last_sent == Some(frame) {
            // Back to what the central already has.
            self.pending = None;
            self.attempts = 0;
            self.state = PeripheralState::Idle;
            return None;
        }
        self.state = PeripheralState::Sending;
        self.pending = Some(frame);
        self.attempts = 1;
        Some(frame)
    }

    pub fn on_send_ok(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.last_sent = Some(frame);
            self.state = PeripheralState::Idle;
            self.attempts = 0;
        }
    }

    pub fn on_send_failed(&mut self) -> SendVerdict {
        let Some(frame) = self.pending else {
            return SendVerdict::GiveUp;
        };
        if self.attempts < self.max_attempts {
            self.attempts += 1;
            return SendVerdict::Retry(frame);
        }
        warn!("Notification dropped after {} attempts", self.attempts);
        self.pending = None;
        self.attempts = 0;
        self.state = PeripheralState::Idle;
        SendVerdict::GiveUp
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
