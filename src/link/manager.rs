//! Discovery & connection manager (central role).
//!
//! State machine:
//!
//! ```text
//! Idle ──tick, queue non-empty, slot free──▶ Connecting(deadline)
//! Connecting ──subscribed──▶ slot allocated, Idle
//! Connecting ──retryable failure, before deadline──▶ Connecting (retry_at)
//! Connecting ──setup failure, deadline or late subscribe──▶ Idle (peer abandoned)
//! ```
//!
//! At most one attempt is in flight. Time is passed in by the caller, in
//! milliseconds, so every transition is a plain method call.

use super::{ConnectionQueue, ControllerSlot, LinkIdentity, SlotId, SlotTable};
use crate::ble::adv_parser::contains_service_uuid128;
use crate::codec::ButtonFrame;
use crate::config::{
    LinkConfig, CONNECTION_QUEUE_CAPACITY, MAX_CONTROLLERS, SERVICE_UUID, SERVICE_UUID_LE,
};
use crate::error::{ConnectError, Error};

/// Radio work the caller must perform for the manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkAction {
    /// Make one connect try to `peer`, then discover and subscribe, all
    /// before `attempt_deadline`. Report back with `on_subscribed` or
    /// `on_attempt_failed`.
    Connect(LinkIdentity),
    /// The attempt for `peer` ran out of time; nothing is left to release.
    GaveUp { peer: LinkIdentity, error: ConnectError },
}

/// Outcome of reporting a failed try.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttemptVerdict {
    /// `tick` will emit another `Connect` at this time.
    RetryAt(u64),
    /// The peer was dropped; it is eligible for re-queueing.
    Abandoned(ConnectError),
    /// The report did not match the in-flight attempt.
    Ignored,
}

/// A subscribed link the manager could not accept. The caller must
/// release `handle`.
#[derive(Debug)]
pub struct Rejected<H> {
    pub handle: H,
    pub reason: Error,
}

#[derive(Clone, Copy)]
struct Attempt {
    peer: LinkIdentity,
    deadline: u64,
    /// `None` while a try is in flight.
    retry_at: Option<u64>,
    tries: u8,
}

/// Connection queue and slot table, kept together so one lock guards both.
pub struct LinkManager<
    H,
    const N: usize = MAX_CONTROLLERS,
    const Q: usize = CONNECTION_QUEUE_CAPACITY,
> {
    config: LinkConfig,
    queue: ConnectionQueue<Q>,
    slots: SlotTable<H, N>,
    attempt: Option<Attempt>,
}

impl<H, const N: usize, const Q: usize> LinkManager<H, N, Q> {
    pub const fn new(config: LinkConfig) -> Self {
        Self {
            config,
            queue: ConnectionQueue::new(),
            slots: SlotTable::new(),
            attempt: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Queue `peer` if it advertises the game-controller service and
    /// could still get a slot. Never starts a connection.
    pub fn on_advertisement(&mut self, peer: LinkIdentity, services: &[u128]) -> bool {
        if !services.contains(&SERVICE_UUID) {
            return false;
        }
        self.accept(peer)
    }

    /// Same as [`on_advertisement`](Self::on_advertisement), reading the
    /// service list from raw advertisement data.
    pub fn on_advertisement_data(&mut self, peer: LinkIdentity, data: &[u8]) -> bool {
        if !contains_service_uuid128(data, &SERVICE_UUID_LE) {
            return false;
        }
        self.accept(peer)
    }

    fn accept(&mut self, peer: LinkIdentity) -> bool {
        if self.slots.is_full()
            || self.slots.is_connected_address(&peer)
            || self.current_attempt() == Some(peer)
        {
            return false;
        }
        match self.queue.push(peer) {
            Ok(queued) => {
                if queued {
                    info!("Controller {} queued ({} waiting)", peer, self.queue.len());
                }
                queued
            }
            Err(e) => {
                warn!("Dropping advertisement from {}: {}", peer, e);
                false
            }
        }
    }

    /// Advance the state machine. Call again while it returns `Some`.
    pub fn tick(&mut self, now: u64) -> Option<LinkAction> {
        if let Some(attempt) = self.attempt.as_mut() {
            let retry_at = attempt.retry_at?;
            if now >= attempt.deadline {
                let peer = attempt.peer;
                self.attempt = None;
                warn!("Controller {} not reachable, giving up", peer);
                return Some(LinkAction::GaveUp {
                    peer,
                    error: ConnectError::Timeout,
                });
            }
            if now < retry_at {
                return None;
            }
            attempt.retry_at = None;
            attempt.tries = attempt.tries.saturating_add(1);
            debug!("Controller {} connect try {}", attempt.peer, attempt.tries);
            return Some(LinkAction::Connect(attempt.peer));
        }

        if self.slots.is_full() {
            return None;
        }

        while let Some(peer) = self.queue.pop() {
            if self.slots.is_connected_address(&peer) {
                continue;
            }
            info!("Connecting to controller {}", peer);
            self.attempt = Some(Attempt {
                peer,
                deadline: now.saturating_add(self.config.connect_timeout_ms),
                retry_at: None,
                tries: 1,
            });
            return Some(LinkAction::Connect(peer));
        }
        None
    }

    /// Report that the in-flight try for `peer` failed at `now`.
    ///
    /// Everything acquired for the try must already be released.
    pub fn on_attempt_failed(
        &mut self,
        now: u64,
        peer: LinkIdentity,
        error: ConnectError,
    ) -> AttemptVerdict {
        let Some(attempt) = self.attempt.as_mut() else {
            return AttemptVerdict::Ignored;
        };
        if attempt.peer != peer || attempt.retry_at.is_some() {
            return AttemptVerdict::Ignored;
        }

        let next = now.saturating_add(self.config.retry_interval_ms);
        if error.is_retryable() && next < attempt.deadline {
            debug!("Controller {} connect failed, retrying", peer);
            attempt.retry_at = Some(next);
            return AttemptVerdict::RetryAt(next);
        }

        let reason = if error.is_retryable() {
            ConnectError::Timeout
        } else {
            error
        };
        warn!("Controller {} abandoned: {}", peer, reason);
        self.attempt = None;
        AttemptVerdict::Abandoned(reason)
    }

    /// Bind a link subscribed at `now` to the smallest unused slot id.
    ///
    /// A subscription that completes after the attempt's deadline is
    /// refused and ends the attempt.
    pub fn on_subscribed(
        &mut self,
        now: u64,
        peer: LinkIdentity,
        handle: H,
    ) -> Result<SlotId, Rejected<H>> {
        let Some(attempt) = self.attempt.filter(|a| a.peer == peer && a.retry_at.is_none()) else {
            return Err(Rejected {
                handle,
                reason: Error::UnexpectedPeer,
            });
        };
        self.attempt = None;

        if now >= attempt.deadline {
            warn!("Controller {} subscribed too late, dropping it", peer);
            return Err(Rejected {
                handle,
                reason: Error::Connect(ConnectError::Timeout),
            });
        }

        let released = ButtonFrame::released(self.config.layout);
        match self.slots.connect_slot(peer, released, handle) {
            Ok(id) => {
                info!("Controller {} connected as player {}", peer, id.get());
                Ok(id)
            }
            Err(handle) => Err(Rejected {
                handle,
                reason: Error::SlotsFull,
            }),
        }
    }

    /// Decode a notification for `slot` and keep it as the slot's last
    /// frame. A malformed payload leaves the last frame untouched.
    pub fn on_notification(&mut self, slot: SlotId, payload: &[u8]) -> Result<ButtonFrame, Error> {
        let LinkConfig {
            layout, polarity, ..
        } = self.config;
        let entry = self.slots.get_mut(slot).ok_or(Error::UnknownSlot)?;
        let frame = ButtonFrame::from_wire(payload, layout, polarity).inspect_err(|e| {
            warn!("Player {}: malformed frame ({})", slot.get(), e);
        })?;
        entry.frame = frame;
        Ok(frame)
    }

    /// Free `slot`. The caller tears down the returned handle.
    pub fn on_disconnect(&mut self, slot: SlotId) -> Option<ControllerSlot<H>> {
        let removed = self.slots.disconnect_slot(slot);
        if let Some(s) = &removed {
            info!("Player {} ({}) disconnected", slot.get(), s.peer);
        }
        removed
    }

    /// Rescan while any slot is free.
    pub fn should_scan(&self) -> bool {
        !self.slots.is_full()
    }

    pub fn is_connecting(&self) -> bool {
        self.attempt.is_some()
    }

    /// Peer of the current attempt, in flight or waiting for a retry.
    pub fn current_attempt(&self) -> Option<LinkIdentity> {
        self.attempt.map(|a| a.peer)
    }

    /// When `tick` next has timed work to do, if anything is scheduled.
    pub fn next_wakeup(&self) -> Option<u64> {
        self.attempt.and_then(|a| a.retry_at)
    }

    /// End of the current attempt's budget. Each try must finish by then.
    pub fn attempt_deadline(&self) -> Option<u64> {
        self.attempt.map(|a| a.deadline)
    }

    pub fn slot(&self, id: SlotId) -> Option<&ControllerSlot<H>> {
        self.slots.get(id)
    }

    pub fn slot_for(&self, peer: &LinkIdentity) -> Option<SlotId> {
        self.slots.slot_for(peer)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ControllerSlot<H>> {
        self.slots.iter()
    }

    pub fn occupied(&self) -> usize {
        self.slots.active_count()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queued(&self, peer: &LinkIdentity) -> bool {
        self.queue.contains(peer)
    }
}
