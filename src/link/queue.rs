use heapless::Deque;

use super::LinkIdentity;
use crate::error::Error;

/// Discovered peers waiting for a connection attempt, oldest first.
pub struct ConnectionQueue<const Q: usize> {
    peers: Deque<LinkIdentity, Q>,
}

impl<const Q: usize> ConnectionQueue<Q> {
    pub const fn new() -> Self {
        Self {
            peers: Deque::new(),
        }
    }

    /// Append `peer` unless it is already waiting.
    ///
    /// Returns `Ok(false)` for a duplicate.
    pub fn push(&mut self, peer: LinkIdentity) -> Result<bool, Error> {
        if self.contains(&peer) {
            return Ok(false);
        }
        self.peers
            .push_back(peer)
            .map(|()| true)
            .map_err(|_| Error::QueueFull)
    }

    pub fn pop(&mut self) -> Option<LinkIdentity> {
        self.peers.pop_front()
    }

    pub fn contains(&self, peer: &LinkIdentity) -> bool {
        self.peers.iter().any(|p| p == peer)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl<const Q: usize> Default for ConnectionQueue<Q> {
    fn default() -> Self {
        Self::new()
    }
}
