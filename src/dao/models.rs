//! Persisted entities shared by every store backend.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lower bound for custom mine counts.
pub const MIN_CUSTOM_MINES: u32 = 10;
/// At most 35% of a custom board may be mines.
pub const MAX_MINE_DENSITY: f64 = 0.35;
/// Inclusive bounds for the number of rounds in a match.
pub const ROUND_RANGE: (u32, u32) = (1, 5);

/// Lifecycle status of a duo match, driving which operations are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for an opponent to join or to flag themselves ready.
    Waiting,
    /// Opponent has joined and declared ready; the host may start.
    Ready,
    /// A synchronized countdown is running before a round starts.
    Countdown,
    /// A round is actively being played.
    Playing,
    /// Both players finished a round; the next one has not started yet.
    RoundComplete,
    /// All rounds are done and a winner has been recorded.
    GameComplete,
}

impl MatchStatus {
    /// Whether the match still accepts settings edits and readiness
    /// toggles (i.e. play has not begun).
    pub fn is_pre_game(self) -> bool {
        matches!(self, MatchStatus::Waiting | MatchStatus::Ready)
    }

    /// Whether a round-ready row may be posted in this status: between
    /// rounds, or while a countdown someone else kicked off is already
    /// running.
    pub fn accepts_round_ready(self) -> bool {
        matches!(self, MatchStatus::RoundComplete | MatchStatus::Countdown)
    }
}

/// Board difficulty presets plus a custom escape hatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// 9×9, 10 mines.
    Easy,
    /// 16×16, 40 mines.
    Medium,
    /// 30×16, 99 mines.
    Hard,
    /// Caller-provided dimensions, validated and clamped.
    Custom,
}

/// Width, height and mine count resolved from the match settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BoardDimensions {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Mines placed on the board.
    pub mines: u32,
}

/// Custom board parameters, present only for [`Difficulty::Custom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomBoard {
    /// Columns, in `[8, 30]`.
    pub width: u32,
    /// Rows, in `[8, 24]`.
    pub height: u32,
    /// Mines, clamped to `[10, floor(width·height·0.35)]` at save time.
    pub mines: u32,
}

/// Match configuration owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MatchSettings {
    /// Difficulty preset.
    pub difficulty: Difficulty,
    /// Number of rounds, in `[1, 5]`.
    pub total_rounds: u32,
    /// Custom dimensions; `Some` iff `difficulty` is custom.
    pub custom: Option<CustomBoard>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            total_rounds: 3,
            custom: None,
        }
    }
}

impl MatchSettings {
    /// Resolve the concrete board dimensions for these settings.
    pub fn dimensions(&self) -> BoardDimensions {
        match self.difficulty {
            Difficulty::Easy => BoardDimensions {
                width: 9,
                height: 9,
                mines: 10,
            },
            Difficulty::Medium => BoardDimensions {
                width: 16,
                height: 16,
                mines: 40,
            },
            Difficulty::Hard => BoardDimensions {
                width: 30,
                height: 16,
                mines: 99,
            },
            Difficulty::Custom => {
                let custom = self.custom.unwrap_or(CustomBoard {
                    width: 16,
                    height: 16,
                    mines: 40,
                });
                BoardDimensions {
                    width: custom.width,
                    height: custom.height,
                    mines: custom.mines,
                }
            }
        }
    }
}

/// Clamp a requested custom mine count into the allowed range for the
/// given board area. Out-of-range requests are adjusted, never rejected.
pub fn clamp_mines(width: u32, height: u32, requested: u32) -> u32 {
    let max = ((width as f64) * (height as f64) * MAX_MINE_DENSITY).floor() as u32;
    requested.clamp(MIN_CUSTOM_MINES, max.max(MIN_CUSTOM_MINES))
}

/// The shared mutable record both clients coordinate through.
///
/// Every mutation re-asserts the full field set; no store backend is
/// trusted with partial-update semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Immutable identifier, shared out-of-band with the joining player.
    pub match_id: Uuid,
    /// Identity currently acting as coordinator; reassigned on handover.
    pub host_id: Uuid,
    /// Second player, `None` until someone joins.
    pub opponent_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// 1-based round counter; never exceeds `total_rounds + 1`.
    pub current_round: u32,
    /// Host-owned configuration.
    pub settings: MatchSettings,
    /// Winner, set only when status is [`MatchStatus::GameComplete`].
    pub winner_id: Option<Uuid>,
    /// Shared seed written by the host so both clients generate the
    /// same minefield; the per-round seed is `board_seed ^ round`.
    pub board_seed: Option<u64>,
    /// Wall-clock anchor for the countdown, unix milliseconds.
    pub countdown_started_at_ms: Option<i64>,
    /// Countdown duration in seconds.
    pub countdown_seconds: Option<u32>,
    /// Creation timestamp, unix milliseconds.
    pub created_at_ms: i64,
    /// Refreshed on every mutation; conflict awareness, not locking.
    pub updated_at_ms: i64,
}

impl MatchRecord {
    /// Fresh record for a newly created match.
    pub fn new(match_id: Uuid, host_id: Uuid, settings: MatchSettings, now_ms: i64) -> Self {
        Self {
            match_id,
            host_id,
            opponent_id: None,
            status: MatchStatus::Waiting,
            current_round: 1,
            settings,
            winner_id: None,
            board_seed: None,
            countdown_started_at_ms: None,
            countdown_seconds: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    /// Whether `user` is the host or the bound opponent.
    pub fn is_member(&self, user: Uuid) -> bool {
        self.host_id == user || self.opponent_id == Some(user)
    }

    /// Seed a given round's board from the shared match seed.
    pub fn round_seed(&self, round: u32) -> Option<u64> {
        self.board_seed.map(|seed| seed ^ u64::from(round))
    }
}

/// Per-player, per-round outcome reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Row posted, board not yet started (pre-countdown readiness).
    Waiting,
    /// The player is actively revealing cells.
    Playing,
    /// The player cleared the board.
    Won,
    /// The player hit a mine or otherwise failed the round.
    Lost,
}

impl ProgressStatus {
    /// Terminal statuses never change again for the round.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgressStatus::Won | ProgressStatus::Lost)
    }
}

/// One row per match × round × player; later writes overwrite earlier
/// ones (upsert). Rows are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundProgressRecord {
    /// Match this row belongs to.
    pub match_id: Uuid,
    /// 1-based round number.
    pub round: u32,
    /// Reporting player.
    pub user_id: Uuid,
    /// Fraction of non-mine cells revealed, in `[0, 1]`.
    pub percent_revealed: f32,
    /// Seconds elapsed in the round so far.
    pub time_elapsed_s: u32,
    /// Row status; `won`/`lost` are terminal.
    pub status: ProgressStatus,
    /// Last write timestamp, unix milliseconds.
    pub updated_at_ms: i64,
}

impl RoundProgressRecord {
    /// Initial zero-progress row posted when a player readies up for a
    /// round.
    pub fn initial(match_id: Uuid, round: u32, user_id: Uuid, now_ms: i64) -> Self {
        Self {
            match_id,
            round,
            user_id,
            percent_revealed: 0.0,
            time_elapsed_s: 0,
            status: ProgressStatus::Waiting,
            updated_at_ms: now_ms,
        }
    }
}

/// Display-only identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Identity the profile describes.
    pub id: Uuid,
    /// Public display name.
    pub username: String,
}
