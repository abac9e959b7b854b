//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is the publish/subscribe hub for [`ChangeEvent`]s. The
//! entity store publishes one event per successful mutation; subscribers
//! (the presentation boundary, loggers, tests) each receive every event.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use flowdeck_core::types::EntityId;
use flowdeck_core::{Project, Task};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// An immutable snapshot of the collection affected by a mutation.
///
/// Snapshots are shared via `Arc`, so fanning an event out to many
/// subscribers never copies the collection itself. Receivers must route
/// any further mutation back through the store's operations.
#[derive(Debug, Clone)]
pub enum CollectionSnapshot {
    Projects(Arc<Vec<Project>>),
    Tasks(Arc<Vec<Task>>),
}

/// A change that was committed to the entity store.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Dot-separated event name, e.g. `"project.created"`.
    pub event_type: String,

    /// Id of the entity the mutation touched.
    pub entity_id: EntityId,

    /// Snapshot of the affected collection, taken after the mutation.
    pub snapshot: CollectionSnapshot,

    /// When the mutation was committed (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create an event for a committed mutation.
    pub fn new(
        event_type: impl Into<String>,
        entity_id: EntityId,
        snapshot: CollectionSnapshot,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            entity_id,
            snapshot,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for store change events.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ChangeEvent`].
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Sending is synchronous: by the time this returns, the event sits in
    /// every subscriber's queue. If there are no active subscribers the
    /// event is dropped.
    pub fn publish(&self, event: ChangeEvent) {
        // Ignore the SendError; it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
