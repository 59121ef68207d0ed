use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Mine Duel Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::match_stream,
        crate::routes::matches::create_match,
        crate::routes::matches::get_match,
        crate::routes::matches::join_match,
        crate::routes::matches::set_ready,
        crate::routes::matches::update_settings,
        crate::routes::matches::start_match,
        crate::routes::matches::transfer_host,
        crate::routes::matches::claim_host,
        crate::routes::matches::leave_match,
        crate::routes::progress::mark_round_ready,
        crate::routes::progress::start_round,
        crate::routes::progress::report_progress,
        crate::routes::progress::get_round_progress,
        crate::routes::profiles::upsert_profile,
        crate::routes::profiles::get_profile,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::matches::CreateMatchRequest,
            crate::dto::matches::SettingsInput,
            crate::dto::matches::CustomBoardInput,
            crate::dto::matches::JoinMatchRequest,
            crate::dto::matches::ReadyRequest,
            crate::dto::matches::UpdateSettingsRequest,
            crate::dto::matches::StartMatchRequest,
            crate::dto::matches::TransferHostRequest,
            crate::dto::matches::ClaimHostRequest,
            crate::dto::matches::LeaveMatchRequest,
            crate::dto::matches::MatchSnapshot,
            crate::dto::matches::MatchResponse,
            crate::dto::matches::PlayerSummary,
            crate::dto::matches::PlayerRole,
            crate::dto::progress::RoundReadyRequest,
            crate::dto::progress::RoundStartRequest,
            crate::dto::progress::ProgressReportRequest,
            crate::dto::progress::ProgressSnapshot,
            crate::dto::progress::RoundProgressResponse,
            crate::dto::profile::UpsertProfileRequest,
            crate::dto::profile::ProfileSummary,
            crate::dto::sse::Handshake,
            crate::dto::sse::MatchChangedEvent,
            crate::dto::sse::ProgressChangedEvent,
            crate::dto::sse::CountdownStartedEvent,
            crate::dao::models::MatchStatus,
            crate::dao::models::Difficulty,
            crate::dao::models::ProgressStatus,
            crate::dao::models::BoardDimensions,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Per-match server-sent event streams"),
        (name = "matches", description = "Match lifecycle operations"),
        (name = "progress", description = "Round readiness and progress reporting"),
        (name = "profiles", description = "Display profiles"),
    )
)]
pub struct ApiDoc;
