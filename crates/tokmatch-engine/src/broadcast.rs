//! Book change fan-out.
//!
//! Every mutation ends with a [`BookUpdate`] published through a
//! [`Broadcaster`]. The engine only emits; subscriber lifecycles and slow
//! consumers are the receiver's problem (`tokio::sync::broadcast` drops
//! the oldest updates for laggards).

use tokio::sync::broadcast;
use tokmatch_types::BookUpdate;

/// Consumes change notifications after each book mutation.
pub trait Broadcaster: Send + Sync {
    /// Publish an update. Must not block the caller.
    fn publish(&self, update: BookUpdate);
}

/// Fan-out over a `tokio::sync::broadcast` channel.
#[derive(Debug)]
pub struct ChannelBroadcaster {
    tx: broadcast::Sender<BookUpdate>,
}

impl ChannelBroadcaster {
    /// Create a broadcaster retaining up to `capacity` undelivered updates
    /// per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future updates.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookUpdate> {
        self.tx.subscribe()
    }

    /// Current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, update: BookUpdate) {
        // No subscribers is not an error.
        let _ = self.tx.send(update);
    }
}

/// Discards every update. For tests and headless deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcaster;

impl Broadcaster for NullBroadcaster {
    fn publish(&self, _update: BookUpdate) {}
}
