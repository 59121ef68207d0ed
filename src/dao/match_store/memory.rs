//! In-memory store backend.
//!
//! The default backend for local play and tests. Join atomicity comes
//! from the DashMap entry lock: the read-check-write inside
//! `claim_opponent_slot` holds the shard lock for the match entry, so
//! two racing joins serialize and exactly one wins.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::dao::{
    match_store::{MatchStore, SlotClaim},
    models::{MatchRecord, MatchStatus, ProfileRecord, RoundProgressRecord},
    storage::StorageResult,
};

/// DashMap-backed [`MatchStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryMatchStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    matches: DashMap<Uuid, MatchRecord>,
    // Rows keyed by (match, round); the inner map preserves insertion
    // order so "who reported first" survives listing.
    progress: DashMap<(Uuid, u32), IndexMap<Uuid, RoundProgressRecord>>,
    profiles: DashMap<Uuid, ProfileRecord>,
}

impl MemoryMatchStore {
    /// Fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&self, id: Uuid, user: Uuid, now_ms: i64) -> SlotClaim {
        let Some(mut entry) = self.inner.matches.get_mut(&id) else {
            return SlotClaim::Missing;
        };

        let record = entry.value_mut();
        if record.host_id == user || record.opponent_id == Some(user) {
            return SlotClaim::AlreadyMember(record.clone());
        }
        if record.opponent_id.is_some() {
            return SlotClaim::Occupied;
        }
        if record.status != MatchStatus::Waiting {
            return SlotClaim::NotJoinable(record.status);
        }

        record.opponent_id = Some(user);
        record.updated_at_ms = now_ms;
        SlotClaim::Claimed(record.clone())
    }
}

impl MatchStore for MemoryMatchStore {
    fn save_match(&self, record: MatchRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.matches.insert(record.match_id, record);
            Ok(())
        })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchRecord>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.matches.get(&id).map(|entry| entry.clone())) })
    }

    fn claim_opponent_slot(
        &self,
        id: Uuid,
        user: Uuid,
        now_ms: i64,
    ) -> BoxFuture<'static, StorageResult<SlotClaim>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.claim(id, user, now_ms)) })
    }

    fn upsert_round_progress(
        &self,
        record: RoundProgressRecord,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .progress
                .entry((record.match_id, record.round))
                .or_default()
                .insert(record.user_id, record);
            Ok(())
        })
    }

    fn list_round_progress(
        &self,
        id: Uuid,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundProgressRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .progress
                .get(&(id, round))
                .map(|rows| rows.values().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn save_profile(&self, profile: ProfileRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.profiles.insert(profile.id, profile);
            Ok(())
        })
    }

    fn find_profiles(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ProfileRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(ids
                .into_iter()
                .filter_map(|id| store.inner.profiles.get(&id).map(|entry| entry.clone()))
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::MatchSettings;

    fn seeded(store: &MemoryMatchStore, host: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        store
            .inner
            .matches
            .insert(id, MatchRecord::new(id, host, MatchSettings::default(), 0));
        id
    }

    #[tokio::test]
    async fn claim_binds_first_caller_only() {
        let store = MemoryMatchStore::new();
        let host = Uuid::new_v4();
        let id = seeded(&store, host);

        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        match store.claim_opponent_slot(id, first, 10).await.unwrap() {
            SlotClaim::Claimed(record) => assert_eq!(record.opponent_id, Some(first)),
            other => panic!("expected claim, got {other:?}"),
        }
        assert_eq!(
            store.claim_opponent_slot(id, second, 20).await.unwrap(),
            SlotClaim::Occupied
        );
    }

    #[tokio::test]
    async fn claim_is_idempotent_for_members() {
        let store = MemoryMatchStore::new();
        let host = Uuid::new_v4();
        let id = seeded(&store, host);

        match store.claim_opponent_slot(id, host, 10).await.unwrap() {
            SlotClaim::AlreadyMember(record) => assert_eq!(record.opponent_id, None),
            other => panic!("expected member rejoin, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn claim_rejects_non_waiting_matches() {
        let store = MemoryMatchStore::new();
        let host = Uuid::new_v4();
        let id = seeded(&store, host);
        store.inner.matches.get_mut(&id).unwrap().status = MatchStatus::Playing;

        assert_eq!(
            store
                .claim_opponent_slot(id, Uuid::new_v4(), 10)
                .await
                .unwrap(),
            SlotClaim::NotJoinable(MatchStatus::Playing)
        );
    }

    #[tokio::test]
    async fn progress_rows_upsert_per_player() {
        let store = MemoryMatchStore::new();
        let id = Uuid::new_v4();
        let user = Uuid::new_v4();

        let mut row = RoundProgressRecord::initial(id, 1, user, 0);
        store.upsert_round_progress(row.clone()).await.unwrap();
        row.percent_revealed = 0.5;
        store.upsert_round_progress(row.clone()).await.unwrap();

        let rows = store.list_round_progress(id, 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].percent_revealed, 0.5);
    }

    #[tokio::test]
    async fn unknown_profiles_are_skipped() {
        let store = MemoryMatchStore::new();
        let known = ProfileRecord {
            id: Uuid::new_v4(),
            username: "ada".into(),
        };
        store.save_profile(known.clone()).await.unwrap();

        let found = store
            .find_profiles(vec![known.id, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(found, vec![known]);
    }
}
