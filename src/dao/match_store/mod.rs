//! Abstraction over the persistence layer for match records, per-round
//! progress rows and player profiles.

pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{MatchRecord, MatchStatus, ProfileRecord, RoundProgressRecord},
    storage::StorageResult,
};

/// Outcome of the atomic opponent-slot claim used by the join flow.
///
/// Exactly one of two racing joiners observes [`SlotClaim::Claimed`];
/// the loser re-reads and sees [`SlotClaim::Occupied`].
#[derive(Debug, Clone, PartialEq)]
pub enum SlotClaim {
    /// The slot was free and is now bound to the caller.
    Claimed(MatchRecord),
    /// The caller is already the host or the bound opponent; nothing
    /// was mutated (idempotent rejoin).
    AlreadyMember(MatchRecord),
    /// A different identity already holds the opponent slot.
    Occupied,
    /// The match is not accepting joins in its current status.
    NotJoinable(MatchStatus),
    /// No match exists under the given id.
    Missing,
}

/// Store abstraction every backend implements.
///
/// `save_match` is a full-record upsert: callers read, mutate and write
/// the whole record so no field is accidentally clobbered by
/// partial-update semantics. The only compare-and-swap operation is
/// [`MatchStore::claim_opponent_slot`].
pub trait MatchStore: Send + Sync {
    /// Upsert the full match record.
    fn save_match(&self, record: MatchRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// Point read of a match record.
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchRecord>>>;
    /// Atomically bind `user` as opponent if the slot is free and the
    /// match is still waiting.
    fn claim_opponent_slot(
        &self,
        id: Uuid,
        user: Uuid,
        now_ms: i64,
    ) -> BoxFuture<'static, StorageResult<SlotClaim>>;
    /// Upsert one progress row keyed by (match, round, user).
    fn upsert_round_progress(
        &self,
        record: RoundProgressRecord,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// All progress rows recorded for a match round.
    fn list_round_progress(
        &self,
        id: Uuid,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundProgressRecord>>>;
    /// Upsert a display profile.
    fn save_profile(&self, profile: ProfileRecord) -> BoxFuture<'static, StorageResult<()>>;
    /// Batch profile lookup; unknown ids are simply absent from the
    /// result.
    fn find_profiles(&self, ids: Vec<Uuid>)
    -> BoxFuture<'static, StorageResult<Vec<ProfileRecord>>>;
    /// Probe backend connectivity.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
