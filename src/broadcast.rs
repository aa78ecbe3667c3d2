//! Connectionless broadcast receiver (alternate transport).
//!
//! Each datagram is a little-endian `u16` bitfield. Senders are bound to
//! slots first come, first served and keep their slot until released;
//! once every slot is taken, datagrams from new senders are dropped.

use crate::codec::ButtonFrame;
use crate::config::{LinkConfig, MAX_CONTROLLERS};
use crate::error::{DecodeError, Error};
use crate::link::{LinkIdentity, SlotId};

/// Datagram payload length.
pub const DATAGRAM_LEN: usize = 2;

pub struct BroadcastReceiver<const N: usize = MAX_CONTROLLERS> {
    config: LinkConfig,
    senders: [Option<LinkIdentity>; N],
}

impl<const N: usize> BroadcastReceiver<N> {
    pub const fn new(config: LinkConfig) -> Self {
        Self {
            config,
            senders: [None; N],
        }
    }

    /// Decode a datagram from `sender`, binding it to a slot if it is new.
    ///
    /// A malformed datagram does not claim a slot.
    pub fn on_datagram(
        &mut self,
        sender: LinkIdentity,
        payload: &[u8],
    ) -> Result<(SlotId, ButtonFrame), Error> {
        let Some(&[lo, hi]) = payload.first_chunk::<DATAGRAM_LEN>() else {
            return Err(DecodeError::Truncated {
                expected: DATAGRAM_LEN,
                actual: payload.len(),
            }
            .into());
        };
        let raw = u16::from_le_bytes([lo, hi]);
        let frame = ButtonFrame::from_le_u16(raw, self.config.layout, self.config.polarity);

        let slot = match self.slot_of(&sender) {
            Some(slot) => slot,
            None => self.assign(sender)?,
        };
        Ok((slot, frame))
    }

    fn assign(&mut self, sender: LinkIdentity) -> Result<SlotId, Error> {
        let Some(index) = self.senders.iter().position(Option::is_none) else {
            warn!("Datagram from unknown {} dropped, no free slot", sender);
            return Err(Error::SlotsFull);
        };
        self.senders[index] = Some(sender);
        let slot = SlotId::from_index(index);
        info!("Assigned {} as controller {}", sender, slot.get());
        Ok(slot)
    }

    pub fn slot_of(&self, sender: &LinkIdentity) -> Option<SlotId> {
        self.senders
            .iter()
            .position(|s| s.as_ref() == Some(sender))
            .map(SlotId::from_index)
    }

    /// Forget the sender bound to `slot`. Returns it, if there was one.
    pub fn release(&mut self, slot: SlotId) -> Option<LinkIdentity> {
        self.senders.get_mut(slot.index()).and_then(Option::take)
    }

    pub fn assigned(&self) -> usize {
        self.senders.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Button, Polarity};

    fn mac(n: u8) -> LinkIdentity {
        LinkIdentity::new([0x24, 0x6F, 0x28, 0x00, 0x00, n])
    }

    fn receiver() -> BroadcastReceiver<2> {
        BroadcastReceiver::new(LinkConfig::new())
    }

    #[test]
    fn first_come_slot_assignment() {
        let mut r = receiver();
        assert_eq!(r.on_datagram(mac(9), &[0, 0]).unwrap().0.get(), 1);
        assert_eq!(r.on_datagram(mac(3), &[0, 0]).unwrap().0.get(), 2);
        // Known senders keep their slot.
        assert_eq!(r.on_datagram(mac(9), &[0, 0]).unwrap().0.get(), 1);
        assert_eq!(r.assigned(), 2);
    }

    #[test]
    fn unknown_sender_dropped_when_full() {
        let mut r = receiver();
        r.on_datagram(mac(1), &[0, 0]).unwrap();
        r.on_datagram(mac(2), &[0, 0]).unwrap();
        assert_eq!(r.on_datagram(mac(3), &[0x01, 0x00]), Err(Error::SlotsFull));
        assert_eq!(r.slot_of(&mac(3)), None);
    }

    #[test]
    fn payload_is_little_endian() {
        let mut r = receiver();
        // Bit 0 = LEFT, bit 10 = PAUSE on the eleven-button layout.
        let (_, frame) = r.on_datagram(mac(1), &[0x01, 0x04]).unwrap();
        let pressed: heapless::Vec<Button, 11> = frame.pressed().collect();
        assert_eq!(&pressed[..], &[Button::Left, Button::Pause]);
    }

    #[test]
    fn pressed_low_senders() {
        let config = LinkConfig::new().with_polarity(Polarity::PressedLow);
        let mut r: BroadcastReceiver<2> = BroadcastReceiver::new(config);
        // Everything high except bit 6 (A).
        let (_, frame) = r.on_datagram(mac(1), &0xFFBFu16.to_le_bytes()).unwrap();
        assert!(frame.is_pressed(Button::A));
        assert_eq!(frame.pressed().count(), 1);
    }

    #[test]
    fn short_datagram_claims_no_slot() {
        let mut r = receiver();
        assert_eq!(
            r.on_datagram(mac(1), &[0x01]),
            Err(Error::Decode(DecodeError::Truncated {
                expected: 2,
                actual: 1
            }))
        );
        assert_eq!(r.assigned(), 0);
    }

    #[test]
    fn release_frees_slot_for_newcomer() {
        let mut r = receiver();
        r.on_datagram(mac(1), &[0, 0]).unwrap();
        r.on_datagram(mac(2), &[0, 0]).unwrap();
        let first = r.slot_of(&mac(1)).unwrap();
        assert_eq!(r.release(first), Some(mac(1)));
        assert_eq!(r.release(first), None);
        let (slot, _) = r.on_datagram(mac(3), &[0, 0]).unwrap();
        assert_eq!(slot, first);
    }
}
