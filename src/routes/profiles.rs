use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::profile::{ProfileSummary, UpsertProfileRequest},
    error::AppError,
    services::profile_service,
    state::SharedState,
};

/// Routes handling display profiles.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/profiles/{id}", put(upsert_profile))
        .route("/profiles/{id}", get(get_profile))
}

/// Create or replace a display profile.
#[utoipa::path(
    put,
    path = "/profiles/{id}",
    tag = "profiles",
    params(("id" = Uuid, Path, description = "Identity the profile describes")),
    request_body = UpsertProfileRequest,
    responses(
        (status = 200, description = "Profile stored", body = ProfileSummary)
    )
)]
pub async fn upsert_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpsertProfileRequest>>,
) -> Result<Json<ProfileSummary>, AppError> {
    let summary = profile_service::upsert_profile(&state, id, payload).await?;
    Ok(Json(summary))
}

/// Fetch a display profile.
#[utoipa::path(
    get,
    path = "/profiles/{id}",
    tag = "profiles",
    params(("id" = Uuid, Path, description = "Identity the profile describes")),
    responses(
        (status = 200, description = "Stored profile", body = ProfileSummary),
        (status = 404, description = "Unknown profile")
    )
)]
pub async fn get_profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileSummary>, AppError> {
    let summary = profile_service::get_profile(&state, id).await?;
    Ok(Json(summary))
}
