//! Listener handles: the registry-visible side of one subscribed connection.
//!
//! A [`ListenerHandle`] pairs a bounded event channel with a cancellation
//! trigger. The registry keeps a clone for broadcast reachability while the
//! subscription task owns the receiving half and performs teardown.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use super::RoomEvent;

/// Unique identifier of a listener handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(uuid::Uuid);

impl ListenerId {
    /// Creates a new random `ListenerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a push to a listener failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The listener's buffer is full; it is not keeping up.
    #[error("listener buffer full")]
    Full,
    /// The receiving side of the listener's channel is gone.
    #[error("listener channel closed")]
    Closed,
    /// The listener's cancellation trigger already fired.
    #[error("listener cancelled")]
    Cancelled,
}

/// One live subscriber connection as seen by the registry.
///
/// Cloning a handle yields another reference to the same channel and the
/// same cancellation trigger.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: ListenerId,
    sender: mpsc::Sender<Arc<RoomEvent>>,
    cancel: CancellationToken,
}

impl ListenerHandle {
    /// Wraps an existing sender and cancellation trigger.
    #[must_use]
    pub fn new(sender: mpsc::Sender<Arc<RoomEvent>>, cancel: CancellationToken) -> Self {
        Self {
            id: ListenerId::new(),
            sender,
            cancel,
        }
    }

    /// Creates a handle backed by a fresh bounded channel.
    ///
    /// `capacity` is clamped to at least one slot.
    #[must_use]
    pub fn channel(
        capacity: usize,
        cancel: CancellationToken,
    ) -> (Self, mpsc::Receiver<Arc<RoomEvent>>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(sender, cancel), receiver)
    }

    /// Returns this handle's identifier.
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Pushes an event without waiting.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] if the listener was cancelled, its buffer
    /// is full, or its receiver has been dropped.
    pub fn try_deliver(&self, event: &Arc<RoomEvent>) -> Result<(), DeliveryError> {
        if self.cancel.is_cancelled() {
            return Err(DeliveryError::Cancelled);
        }
        self.sender
            .try_send(Arc::clone(event))
            .map_err(|err| match err {
                TrySendError::Full(_) => DeliveryError::Full,
                TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }

    /// Fires the cancellation trigger. Safe to call any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once the cancellation trigger has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
