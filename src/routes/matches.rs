use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::matches::{
        ClaimHostRequest, CreateMatchRequest, JoinMatchRequest, LeaveMatchRequest, MatchResponse,
        ReadyRequest, StartMatchRequest, TransferHostRequest, UpdateSettingsRequest,
    },
    error::AppError,
    services::match_service,
    state::SharedState,
};

/// Routes handling the match lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches", post(create_match))
        .route("/matches/{id}", get(get_match))
        .route("/matches/{id}/join", post(join_match))
        .route("/matches/{id}/ready", post(set_ready))
        .route("/matches/{id}/settings", put(update_settings))
        .route("/matches/{id}/start", post(start_match))
        .route("/matches/{id}/transfer-host", post(transfer_host))
        .route("/matches/{id}/claim-host", post(claim_host))
        .route("/matches/{id}/leave", post(leave_match))
}

/// Open a new match lobby.
#[utoipa::path(
    post,
    path = "/matches",
    tag = "matches",
    request_body = CreateMatchRequest,
    responses(
        (status = 200, description = "Match created", body = MatchResponse)
    )
)]
pub async fn create_match(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateMatchRequest>>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::create_match(&state, payload).await?;
    Ok(Json(response))
}

/// Fetch the current state of a match.
#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Current match state", body = MatchResponse),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::get_match(&state, id).await?;
    Ok(Json(response))
}

/// Join a match as the opponent.
#[utoipa::path(
    post,
    path = "/matches/{id}/join",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = JoinMatchRequest,
    responses(
        (status = 200, description = "Joined (or already a member)", body = MatchResponse),
        (status = 404, description = "Unknown match"),
        (status = 409, description = "Slot occupied or match not joinable")
    )
)]
pub async fn join_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<JoinMatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::join_match(&state, id, payload).await?;
    Ok(Json(response))
}

/// Toggle the opponent's lobby readiness.
#[utoipa::path(
    post,
    path = "/matches/{id}/ready",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = ReadyRequest,
    responses(
        (status = 200, description = "Readiness recorded", body = MatchResponse),
        (status = 409, description = "Match already underway")
    )
)]
pub async fn set_ready(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReadyRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::set_ready(&state, id, payload).await?;
    Ok(Json(response))
}

/// Replace the match settings.
#[utoipa::path(
    put,
    path = "/matches/{id}/settings",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings replaced", body = MatchResponse),
        (status = 401, description = "Caller is not the host"),
        (status = 409, description = "Match already underway")
    )
)]
pub async fn update_settings(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<UpdateSettingsRequest>>,
) -> Result<Json<MatchResponse>, AppError> {
    let response =
        match_service::update_settings(&state, id, payload.user_id, payload.settings).await?;
    Ok(Json(response))
}

/// Start the match and anchor the first countdown.
#[utoipa::path(
    post,
    path = "/matches/{id}/start",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = StartMatchRequest,
    responses(
        (status = 200, description = "Countdown anchored", body = MatchResponse),
        (status = 401, description = "Caller is not the host"),
        (status = 409, description = "Opponent missing or not ready")
    )
)]
pub async fn start_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartMatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::start_match(&state, id, payload).await?;
    Ok(Json(response))
}

/// Hand the host role to the opponent.
#[utoipa::path(
    post,
    path = "/matches/{id}/transfer-host",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = TransferHostRequest,
    responses(
        (status = 200, description = "Roles swapped", body = MatchResponse),
        (status = 401, description = "Caller is not the host")
    )
)]
pub async fn transfer_host(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferHostRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::transfer_host(&state, id, payload).await?;
    Ok(Json(response))
}

/// Claim the host role after the previous host departed.
#[utoipa::path(
    post,
    path = "/matches/{id}/claim-host",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = ClaimHostRequest,
    responses(
        (status = 200, description = "Opponent promoted to host", body = MatchResponse),
        (status = 401, description = "Caller is not the bound opponent")
    )
)]
pub async fn claim_host(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClaimHostRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::claim_host(&state, id, payload).await?;
    Ok(Json(response))
}

/// Record a deliberate departure from the match.
#[utoipa::path(
    post,
    path = "/matches/{id}/leave",
    tag = "matches",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = LeaveMatchRequest,
    responses(
        (status = 200, description = "Departure recorded", body = MatchResponse)
    )
)]
pub async fn leave_match(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LeaveMatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = match_service::leave_match(&state, id, payload).await?;
    Ok(Json(response))
}
