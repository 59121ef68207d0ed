use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dto::{
        matches::MatchResponse,
        progress::{
            ProgressReportRequest, ProgressSnapshot, RoundProgressResponse, RoundReadyRequest,
            RoundStartRequest,
        },
    },
    error::AppError,
    services::progress_service,
    state::SharedState,
};

/// Routes handling per-round readiness and progress reporting.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches/{id}/rounds/ready", post(mark_round_ready))
        .route("/matches/{id}/rounds/start", post(start_round))
        .route(
            "/matches/{id}/progress",
            post(report_progress).get(get_round_progress),
        )
}

/// Query selecting which round's rows to list.
#[derive(Debug, Deserialize)]
pub struct RoundQuery {
    /// Round number; defaults to the current round.
    pub round: Option<u32>,
}

/// Declare readiness for the upcoming round.
#[utoipa::path(
    post,
    path = "/matches/{id}/rounds/ready",
    tag = "progress",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = RoundReadyRequest,
    responses(
        (status = 200, description = "Readiness recorded; countdown anchored once both are ready", body = MatchResponse),
        (status = 409, description = "Round readiness not accepted in the current status")
    )
)]
pub async fn mark_round_ready(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoundReadyRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = progress_service::mark_round_ready(&state, id, payload.user_id).await?;
    Ok(Json(response))
}

/// Flip an elapsed countdown into a live round.
#[utoipa::path(
    post,
    path = "/matches/{id}/rounds/start",
    tag = "progress",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = RoundStartRequest,
    responses(
        (status = 200, description = "Round running (idempotent)", body = MatchResponse),
        (status = 409, description = "No countdown to start from")
    )
)]
pub async fn start_round(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoundStartRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = progress_service::start_round(&state, id, payload.user_id).await?;
    Ok(Json(response))
}

/// Report in-round progress for the calling player.
#[utoipa::path(
    post,
    path = "/matches/{id}/progress",
    tag = "progress",
    params(("id" = Uuid, Path, description = "Match identifier")),
    request_body = ProgressReportRequest,
    responses(
        (status = 200, description = "Row as stored", body = ProgressSnapshot),
        (status = 409, description = "No round is being played")
    )
)]
pub async fn report_progress(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ProgressReportRequest>>,
) -> Result<Json<ProgressSnapshot>, AppError> {
    let snapshot = progress_service::report_progress(&state, id, payload).await?;
    Ok(Json(snapshot))
}

/// List progress rows for a round.
#[utoipa::path(
    get,
    path = "/matches/{id}/progress",
    tag = "progress",
    params(
        ("id" = Uuid, Path, description = "Match identifier"),
        ("round" = Option<u32>, Query, description = "Round number, defaults to the current round")
    ),
    responses(
        (status = 200, description = "Rows for the round", body = RoundProgressResponse),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_round_progress(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RoundQuery>,
) -> Result<Json<RoundProgressResponse>, AppError> {
    let response = progress_service::get_round_progress(&state, id, query.round).await?;
    Ok(Json(response))
}
