//! Refresh notifications fired after every successful store mutation.
//!
//! Presentation surfaces (panel views, hover providers) subscribe and re-read
//! the store when an event arrives; the event carries only the affected path,
//! never annotation data, so a lagging subscriber loses nothing it cannot
//! recover by re-reading.

use tokio::sync::broadcast;

/// Notification that the annotation set changed for one file.
///
/// Marked `#[non_exhaustive]` so later event kinds (e.g. a store-wide reload
/// after external file replacement) do not break existing match arms.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum StoreEvent {
    /// An annotation was added, deleted, or edited under `path`.
    AnnotationsChanged { path: String },
}

/// Broadcast bus carrying [`StoreEvent`]s to any number of subscribers.
///
/// Backed by a `tokio::sync::broadcast` channel. Sending with no live
/// receivers is not an error — a headless embedding simply has nobody
/// listening. Slow subscribers may observe `Lagged`; they should respond by
/// re-reading the store rather than replaying events.
#[derive(Debug)]
pub struct StoreEventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl StoreEventBus {
    /// Channel capacity. Mutations are user-triggered and rare; 64 pending
    /// events means a subscriber has stalled for a long time already.
    const CAPACITY: usize = 64;

    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(Self::CAPACITY);
        Self { tx }
    }

    /// Registers a new subscriber. Events emitted before this call are not
    /// delivered to it.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Emits an event to all current subscribers, ignoring the no-receiver
    /// case.
    pub(crate) fn emit(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for StoreEventBus {
    fn default() -> Self {
        Self::new()
    }
}
