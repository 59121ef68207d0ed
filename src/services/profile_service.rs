//! Display profile operations.

use uuid::Uuid;

use crate::{
    dao::models::ProfileRecord,
    dto::profile::{ProfileSummary, UpsertProfileRequest},
    error::ServiceError,
    state::SharedState,
};

/// Create or replace the display profile for an identity.
pub async fn upsert_profile(
    state: &SharedState,
    id: Uuid,
    request: UpsertProfileRequest,
) -> Result<ProfileSummary, ServiceError> {
    let record = ProfileRecord {
        id,
        username: request.username.trim().to_owned(),
    };
    state.store().save_profile(record.clone()).await?;
    Ok(record.into())
}

/// Fetch one profile.
pub async fn get_profile(state: &SharedState, id: Uuid) -> Result<ProfileSummary, ServiceError> {
    let profiles = state.store().find_profiles(vec![id]).await?;
    profiles
        .into_iter()
        .next()
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("profile `{id}`")))
}
