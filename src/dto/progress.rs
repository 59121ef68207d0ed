use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ProgressStatus, RoundProgressRecord},
    dto::format_unix_ms,
};

/// Declares a player ready for the upcoming round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoundReadyRequest {
    /// Readying identity.
    pub user_id: Uuid,
}

/// Asks the server to flip an elapsed countdown into a live round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RoundStartRequest {
    /// Requesting identity.
    pub user_id: Uuid,
}

/// In-round progress report posted by a playing client.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ProgressReportRequest {
    /// Reporting identity.
    pub user_id: Uuid,
    /// Fraction of non-mine cells revealed.
    #[validate(range(min = 0.0, max = 1.0))]
    pub percent_revealed: f32,
    /// Seconds elapsed since the round started.
    pub time_elapsed_s: u32,
    /// Current row status.
    pub status: ProgressStatus,
}

/// Serializable projection of one progress row.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ProgressSnapshot {
    /// Match the row belongs to.
    pub match_id: Uuid,
    /// 1-based round number.
    pub round: u32,
    /// Reporting player.
    pub user_id: Uuid,
    /// Fraction of non-mine cells revealed.
    pub percent_revealed: f32,
    /// Seconds elapsed in the round.
    pub time_elapsed_s: u32,
    /// Row status.
    pub status: ProgressStatus,
    /// Last write time, RFC 3339.
    pub updated_at: String,
}

impl From<&RoundProgressRecord> for ProgressSnapshot {
    fn from(record: &RoundProgressRecord) -> Self {
        Self {
            match_id: record.match_id,
            round: record.round,
            user_id: record.user_id,
            percent_revealed: record.percent_revealed,
            time_elapsed_s: record.time_elapsed_s,
            status: record.status,
            updated_at: format_unix_ms(record.updated_at_ms),
        }
    }
}

/// All progress rows for one round of a match.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundProgressResponse {
    /// Round the rows belong to.
    pub round: u32,
    /// One row per player that has reported.
    pub rows: Vec<ProgressSnapshot>,
}
