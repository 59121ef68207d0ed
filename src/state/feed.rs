use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::dto::sse::MatchEvent;

/// Per-match broadcast hubs used to fan out change events to SSE
/// subscribers.
///
/// Hubs are created lazily on first subscribe or publish. A publish
/// with no subscribers is dropped, matching at-most-once change-feed
/// semantics; clients reconcile from the store on reconnect.
pub struct MatchFeed {
    capacity: usize,
    channels: DashMap<Uuid, broadcast::Sender<MatchEvent>>,
}

impl MatchFeed {
    /// Build a feed whose per-match channels buffer `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: DashMap::new(),
        }
    }

    fn sender(&self, match_id: Uuid) -> broadcast::Sender<MatchEvent> {
        self.channels
            .entry(match_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Register a new subscriber for one match's event stream.
    pub fn subscribe(&self, match_id: Uuid) -> broadcast::Receiver<MatchEvent> {
        self.sender(match_id).subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn publish(&self, match_id: Uuid, event: MatchEvent) {
        let _ = self.sender(match_id).send(event);
    }

    /// Drop the hub for a finished match so the map does not grow
    /// without bound. Existing receivers keep draining buffered events.
    pub fn forget(&self, match_id: Uuid) {
        self.channels.remove(&match_id);
    }
}
