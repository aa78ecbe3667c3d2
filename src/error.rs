//! Unified error type for padlink.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (feature `defmt`) for on-target logging.

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A connection attempt failed.
    Connect(ConnectError),

    /// A received frame could not be decoded.
    Decode(DecodeError),

    /// Every controller slot is occupied.
    SlotsFull,

    /// The connection queue has no room for another peer.
    QueueFull,

    /// The slot id does not refer to an occupied slot.
    UnknownSlot,

    /// The peer is not the one the manager is currently connecting.
    UnexpectedPeer,
}

/// Why a connection attempt did not produce a subscribed link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectError {
    /// One GAP connect try failed or timed out; may be retried.
    ConnectFailed,
    /// The overall attempt budget ran out.
    Timeout,
    /// The peer does not expose the game-controller service.
    ServiceNotFound,
    /// The service lacks the button-state characteristic.
    CharacteristicNotFound,
    /// The characteristic refused the notification subscription.
    NotifyUnsupported,
}

impl ConnectError {
    /// GAP-level failures are retried within the attempt budget; GATT
    /// layout failures are final.
    pub fn is_retryable(self) -> bool {
        matches!(self, ConnectError::ConnectFailed)
    }
}

/// Frame decoding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Payload shorter than the layout's wire length.
    Truncated { expected: usize, actual: usize },
}

// Convenience conversions

impl From<ConnectError> for Error {
    fn from(e: ConnectError) -> Self {
        Error::Connect(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}
