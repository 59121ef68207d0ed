//! MongoDB-backed [`MatchStore`].
//!
//! Every write reasserts the full document via `replace_one` + upsert,
//! except the opponent-slot claim which is a filtered `update_one` so
//! that two racing joins resolve server-side.

use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, doc},
    options::IndexOptions,
};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoMatchDocument, MongoProgressDocument, doc_id, uuid_as_binary},
};
use crate::dao::{
    match_store::{MatchStore, SlotClaim},
    models::{MatchRecord, MatchStatus, ProfileRecord, RoundProgressRecord},
    storage::StorageResult,
};

const MATCH_COLLECTION_NAME: &str = "matches";
const PROGRESS_COLLECTION_NAME: &str = "round_progress";
const PROFILE_COLLECTION_NAME: &str = "profiles";

/// Store backend talking to a MongoDB replica set or single node.
#[derive(Clone)]
pub struct MongoMatchStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoMatchStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self {
            inner: Arc::new(MongoInner { client, database }),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self
            .inner
            .database
            .collection::<MongoProgressDocument>(PROGRESS_COLLECTION_NAME);
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"match_id": 1, "round": 1, "user_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("progress_row_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PROGRESS_COLLECTION_NAME,
                index: "match_id,round,user_id",
                source,
            })?;

        Ok(())
    }

    fn match_collection(&self) -> Collection<MongoMatchDocument> {
        self.inner
            .database
            .collection::<MongoMatchDocument>(MATCH_COLLECTION_NAME)
    }

    fn progress_collection(&self) -> Collection<MongoProgressDocument> {
        self.inner
            .database
            .collection::<MongoProgressDocument>(PROGRESS_COLLECTION_NAME)
    }

    fn profile_collection(&self) -> Collection<ProfileRecord> {
        self.inner
            .database
            .collection::<ProfileRecord>(PROFILE_COLLECTION_NAME)
    }

    async fn save_match(&self, record: MatchRecord) -> MongoResult<()> {
        let id = record.match_id;
        let document: MongoMatchDocument = record.into();
        self.match_collection()
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveMatch { id, source })?;
        Ok(())
    }

    async fn find_match(&self, id: Uuid) -> MongoResult<Option<MatchRecord>> {
        let document = self
            .match_collection()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadMatch { id, source })?;
        Ok(document.map(Into::into))
    }

    /// Bind `user` as opponent iff the slot is free and the match is
    /// still waiting. The filtered update is the only atomicity we
    /// need; the follow-up read just classifies what happened.
    async fn claim_opponent_slot(
        &self,
        id: Uuid,
        user: Uuid,
        now_ms: i64,
    ) -> MongoResult<SlotClaim> {
        let filter = doc! {
            "_id": uuid_as_binary(id),
            "opponent_id": Bson::Null,
            "status": "waiting",
        };
        let update = doc! {
            "$set": {
                "opponent_id": uuid_as_binary(user),
                "updated_at_ms": now_ms,
            }
        };

        let result = self
            .match_collection()
            .update_one(filter, update)
            .await
            .map_err(|source| MongoDaoError::ClaimSlot { id, source })?;

        let Some(record) = self.find_match(id).await? else {
            return Ok(SlotClaim::Missing);
        };

        if result.modified_count == 1 {
            return Ok(SlotClaim::Claimed(record));
        }
        if record.is_member(user) {
            return Ok(SlotClaim::AlreadyMember(record));
        }
        if record.opponent_id.is_some() {
            return Ok(SlotClaim::Occupied);
        }
        if record.status != MatchStatus::Waiting {
            return Ok(SlotClaim::NotJoinable(record.status));
        }
        // Filter missed but the re-read looks claimable: a concurrent
        // writer reverted state between the two operations. Report the
        // slot as occupied and let the caller retry.
        Ok(SlotClaim::Occupied)
    }

    async fn upsert_round_progress(&self, record: RoundProgressRecord) -> MongoResult<()> {
        let id = record.match_id;
        let filter = doc! {
            "match_id": uuid_as_binary(record.match_id),
            "round": record.round,
            "user_id": uuid_as_binary(record.user_id),
        };
        let document: MongoProgressDocument = record.into();
        self.progress_collection()
            .replace_one(filter, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveProgress { id, source })?;
        Ok(())
    }

    async fn list_round_progress(
        &self,
        id: Uuid,
        round: u32,
    ) -> MongoResult<Vec<RoundProgressRecord>> {
        let documents: Vec<MongoProgressDocument> = self
            .progress_collection()
            .find(doc! {"match_id": uuid_as_binary(id), "round": round})
            .sort(doc! {"updated_at_ms": 1})
            .await
            .map_err(|source| MongoDaoError::ListProgress { id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListProgress { id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn save_profile(&self, profile: ProfileRecord) -> MongoResult<()> {
        let id = profile.id;
        self.profile_collection()
            .replace_one(doc! {"id": uuid_as_binary(id)}, &profile)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveProfile { id, source })?;
        Ok(())
    }

    async fn find_profiles(&self, ids: Vec<Uuid>) -> MongoResult<Vec<ProfileRecord>> {
        let binary_ids: Vec<_> = ids.into_iter().map(uuid_as_binary).collect();
        let profiles: Vec<ProfileRecord> = self
            .profile_collection()
            .find(doc! {"id": {"$in": binary_ids}})
            .await
            .map_err(|source| MongoDaoError::LoadProfiles { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadProfiles { source })?;
        Ok(profiles)
    }

    async fn ping(&self) -> MongoResult<()> {
        self.inner
            .database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

impl MatchStore for MongoMatchStore {
    fn save_match(&self, record: MatchRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_match(record).await.map_err(Into::into) })
    }

    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.find_match(id).await.map_err(Into::into) })
    }

    fn claim_opponent_slot(
        &self,
        id: Uuid,
        user: Uuid,
        now_ms: i64,
    ) -> BoxFuture<'static, StorageResult<SlotClaim>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .claim_opponent_slot(id, user, now_ms)
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_round_progress(
        &self,
        record: RoundProgressRecord,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_round_progress(record).await.map_err(Into::into) })
    }

    fn list_round_progress(
        &self,
        id: Uuid,
        round: u32,
    ) -> BoxFuture<'static, StorageResult<Vec<RoundProgressRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_round_progress(id, round)
                .await
                .map_err(Into::into)
        })
    }

    fn save_profile(&self, profile: ProfileRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_profile(profile).await.map_err(Into::into) })
    }

    fn find_profiles(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ProfileRecord>>> {
        let store = self.clone();
        Box::pin(async move { store.find_profiles(ids).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
