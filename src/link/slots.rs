use super::{LinkIdentity, SlotId};
use crate::codec::ButtonFrame;

/// A subscribed controller.
///
/// Owns the connection handle `H`; whoever removes the slot from the
/// table is responsible for releasing the link.
pub struct ControllerSlot<H> {
    pub id: SlotId,
    pub peer: LinkIdentity,
    pub frame: ButtonFrame,
    pub handle: H,
}

/// Fixed table of `N` controller slots, indexed by `SlotId::index()`.
pub struct SlotTable<H, const N: usize> {
    slots: [Option<ControllerSlot<H>>; N],
}

impl<H, const N: usize> SlotTable<H, N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { None }; N],
        }
    }

    /// Smallest unused slot id.
    pub fn find_empty_slot(&self) -> Option<SlotId> {
        self.slots
            .iter()
            .position(Option::is_none)
            .map(SlotId::from_index)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.active_count() == N
    }

    pub fn slot_for(&self, peer: &LinkIdentity) -> Option<SlotId> {
        self.iter().find(|s| s.peer == *peer).map(|s| s.id)
    }

    pub fn is_connected_address(&self, peer: &LinkIdentity) -> bool {
        self.slot_for(peer).is_some()
    }

    /// Occupy the smallest free slot. Hands `handle` back when full.
    pub fn connect_slot(
        &mut self,
        peer: LinkIdentity,
        frame: ButtonFrame,
        handle: H,
    ) -> Result<SlotId, H> {
        let Some(id) = self.find_empty_slot() else {
            return Err(handle);
        };
        self.slots[id.index()] = Some(ControllerSlot {
            id,
            peer,
            frame,
            handle,
        });
        Ok(id)
    }

    pub fn disconnect_slot(&mut self, id: SlotId) -> Option<ControllerSlot<H>> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    pub fn get(&self, id: SlotId) -> Option<&ControllerSlot<H>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut ControllerSlot<H>> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Occupied slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = &ControllerSlot<H>> {
        self.slots.iter().flatten()
    }
}

impl<H, const N: usize> Default for SlotTable<H, N> {
    fn default() -> Self {
        Self::new()
    }
}
