//! Host departure flags and the claim window.
//!
//! When a host closes their client mid-lobby, it records a departure
//! flag in a small key-value store both clients can reach. The
//! opponent's client consumes the flag and, while it is still fresh,
//! claims the host role through the coordinator. A stale flag means the
//! departure is old news and the opponent should treat the match as
//! abandoned instead.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Evidence that the host left a match deliberately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartureFlag {
    /// Match the departure concerns.
    pub match_id: Uuid,
    /// The host that departed.
    pub host_id: Uuid,
    /// When the departure was recorded, unix milliseconds.
    pub recorded_at_ms: i64,
}

/// Minimal keyed flag storage shared between the two clients.
pub trait FlagStore: Send + Sync {
    /// Store the flag for its match, replacing any previous one.
    fn set(&self, flag: DepartureFlag);
    /// Read the flag without removing it.
    fn get(&self, match_id: Uuid) -> Option<DepartureFlag>;
    /// Remove and return the flag.
    fn remove(&self, match_id: Uuid) -> Option<DepartureFlag>;
}

/// In-process [`FlagStore`] used by tests and single-host deployments.
#[derive(Default)]
pub struct MemoryFlagStore {
    flags: DashMap<Uuid, DepartureFlag>,
}

impl MemoryFlagStore {
    /// Fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn set(&self, flag: DepartureFlag) {
        self.flags.insert(flag.match_id, flag);
    }

    fn get(&self, match_id: Uuid) -> Option<DepartureFlag> {
        self.flags.get(&match_id).map(|entry| entry.clone())
    }

    fn remove(&self, match_id: Uuid) -> Option<DepartureFlag> {
        self.flags.remove(&match_id).map(|(_, flag)| flag)
    }
}

/// Record that the host is leaving `match_id` right now.
pub fn record_departure(store: &dyn FlagStore, match_id: Uuid, host_id: Uuid, now_ms: i64) {
    store.set(DepartureFlag {
        match_id,
        host_id,
        recorded_at_ms: now_ms,
    });
}

/// Consume the departure flag for `match_id`, returning it only while
/// it is still inside the claim window.
///
/// The flag is removed either way: a fresh flag is spent by the claim
/// it authorises, and a stale one is garbage that should not authorise
/// anything later.
pub fn consume_departure(
    store: &dyn FlagStore,
    match_id: Uuid,
    now_ms: i64,
    window_secs: i64,
) -> Option<DepartureFlag> {
    let flag = store.remove(match_id)?;
    let age_ms = now_ms - flag.recorded_at_ms;
    if age_ms <= window_secs * 1_000 {
        Some(flag)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW_SECS: i64 = 30;

    #[test]
    fn fresh_flag_authorises_a_claim() {
        let store = MemoryFlagStore::new();
        let match_id = Uuid::new_v4();
        let host_id = Uuid::new_v4();
        record_departure(&store, match_id, host_id, 100_000);

        // Opponent notices five seconds later.
        let flag = consume_departure(&store, match_id, 105_000, WINDOW_SECS);
        assert_eq!(flag.map(|f| f.host_id), Some(host_id));
    }

    #[test]
    fn stale_flag_is_discarded() {
        let store = MemoryFlagStore::new();
        let match_id = Uuid::new_v4();
        record_departure(&store, match_id, Uuid::new_v4(), 100_000);

        // Forty seconds later the window has closed.
        assert_eq!(consume_departure(&store, match_id, 140_000, WINDOW_SECS), None);
        // And the stale flag is gone rather than lingering.
        assert_eq!(store.get(match_id), None);
    }

    #[test]
    fn consuming_spends_the_flag() {
        let store = MemoryFlagStore::new();
        let match_id = Uuid::new_v4();
        record_departure(&store, match_id, Uuid::new_v4(), 100_000);

        assert!(consume_departure(&store, match_id, 101_000, WINDOW_SECS).is_some());
        assert!(consume_departure(&store, match_id, 101_500, WINDOW_SECS).is_none());
    }

    #[test]
    fn boundary_is_inclusive() {
        let store = MemoryFlagStore::new();
        let match_id = Uuid::new_v4();
        record_departure(&store, match_id, Uuid::new_v4(), 0);

        assert!(consume_departure(&store, match_id, WINDOW_SECS * 1_000, WINDOW_SECS).is_some());
    }

    #[test]
    fn rerecording_replaces_the_old_flag() {
        let store = MemoryFlagStore::new();
        let match_id = Uuid::new_v4();
        record_departure(&store, match_id, Uuid::new_v4(), 0);
        let second_host = Uuid::new_v4();
        record_departure(&store, match_id, second_host, 500_000);

        let flag = consume_departure(&store, match_id, 501_000, WINDOW_SECS).unwrap();
        assert_eq!(flag.host_id, second_host);
        assert_eq!(flag.recorded_at_ms, 500_000);
    }
}
