use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    dao::models::{
        BoardDimensions, CustomBoard, Difficulty, MatchRecord, MatchSettings, MatchStatus,
        ProfileRecord,
    },
    dto::format_unix_ms,
};

/// Payload used to open a brand-new match lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateMatchRequest {
    /// Identity of the creating player; becomes the first host.
    pub host_id: Uuid,
    /// Initial settings; defaults apply when omitted.
    #[validate(nested)]
    pub settings: Option<SettingsInput>,
}

/// Incoming match settings, applied on create or via a settings update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[validate(schema(function = validate_settings_input))]
pub struct SettingsInput {
    /// Difficulty preset.
    pub difficulty: Difficulty,
    /// Rounds to play.
    #[validate(range(min = 1, max = 5))]
    pub total_rounds: u32,
    /// Custom board, required when `difficulty` is `custom`.
    #[serde(default)]
    #[validate(nested)]
    pub custom: Option<CustomBoardInput>,
}

/// Custom board dimensions supplied by the host.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CustomBoardInput {
    /// Columns.
    #[validate(range(min = 8, max = 30))]
    pub width: u32,
    /// Rows.
    #[validate(range(min = 8, max = 24))]
    pub height: u32,
    /// Requested mines; clamped server-side rather than rejected.
    pub mines: u32,
}

/// Custom difficulty makes no sense without dimensions to go with it.
fn validate_settings_input(input: &SettingsInput) -> Result<(), ValidationError> {
    if input.difficulty == Difficulty::Custom && input.custom.is_none() {
        let mut err = ValidationError::new("custom_board_missing");
        err.message = Some("Custom difficulty requires explicit board dimensions".into());
        return Err(err);
    }
    Ok(())
}

impl SettingsInput {
    /// Resolve into persisted settings, clamping the custom mine count.
    pub fn into_settings(self) -> MatchSettings {
        let custom = self.custom.map(|input| CustomBoard {
            width: input.width,
            height: input.height,
            mines: crate::dao::models::clamp_mines(input.width, input.height, input.mines),
        });
        MatchSettings {
            difficulty: self.difficulty,
            total_rounds: self.total_rounds,
            custom,
        }
    }
}

/// Payload used to join an existing match as the opponent.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinMatchRequest {
    /// Joining identity.
    pub user_id: Uuid,
}

/// Readiness toggle sent by the non-host player in the lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReadyRequest {
    /// Toggling identity.
    pub user_id: Uuid,
    /// Desired readiness.
    pub ready: bool,
}

/// Settings replacement sent by the host from the lobby.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateSettingsRequest {
    /// Requesting identity; must be the host.
    pub user_id: Uuid,
    /// Replacement settings.
    #[validate(nested)]
    pub settings: SettingsInput,
}

/// Host request to start the match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartMatchRequest {
    /// Requesting identity; must be the host.
    pub user_id: Uuid,
    /// Shared board seed; generated server-side when omitted.
    #[serde(default)]
    pub board_seed: Option<u64>,
}

/// Host request to hand coordination to the opponent.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct TransferHostRequest {
    /// Requesting identity; must be the current host.
    pub user_id: Uuid,
}

/// Opponent request to take over after a recorded host departure.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClaimHostRequest {
    /// Claiming identity; must be the bound opponent.
    pub user_id: Uuid,
}

/// Notice that a player is leaving the match.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LeaveMatchRequest {
    /// Departing identity.
    pub user_id: Uuid,
}

/// Serializable projection of a match record.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct MatchSnapshot {
    /// Match identifier.
    pub match_id: Uuid,
    /// Current coordinator.
    pub host_id: Uuid,
    /// Bound opponent, if any.
    pub opponent_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// 1-based round counter.
    pub current_round: u32,
    /// Rounds to play.
    pub total_rounds: u32,
    /// Difficulty preset.
    pub difficulty: Difficulty,
    /// Resolved board dimensions for the current settings.
    pub board: BoardDimensions,
    /// Winner, present once the game completes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<Uuid>,
    /// Shared board seed, present once the match has started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_seed: Option<u64>,
    /// Countdown anchor, unix milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_started_at_ms: Option<i64>,
    /// Countdown duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u32>,
    /// Creation time, RFC 3339.
    pub created_at: String,
    /// Last mutation time, RFC 3339.
    pub updated_at: String,
}

impl From<&MatchRecord> for MatchSnapshot {
    fn from(record: &MatchRecord) -> Self {
        Self {
            match_id: record.match_id,
            host_id: record.host_id,
            opponent_id: record.opponent_id,
            status: record.status,
            current_round: record.current_round,
            total_rounds: record.settings.total_rounds,
            difficulty: record.settings.difficulty,
            board: record.settings.dimensions(),
            winner_id: record.winner_id,
            board_seed: record.board_seed,
            countdown_started_at_ms: record.countdown_started_at_ms,
            countdown_seconds: record.countdown_seconds,
            created_at: format_unix_ms(record.created_at_ms),
            updated_at: format_unix_ms(record.updated_at_ms),
        }
    }
}

/// Role a player occupies inside a match.
#[derive(Clone, Copy, Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    /// Coordinating player.
    Host,
    /// Second player.
    Opponent,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public projection of a match member exposed to REST/SSE clients.
pub struct PlayerSummary {
    /// Player identity.
    pub id: Uuid,
    /// Display name, when a profile exists.
    pub username: Option<String>,
    /// Host or opponent.
    pub role: PlayerRole,
}

/// Full match response combining the snapshot with member profiles.
#[derive(Debug, Serialize, ToSchema)]
pub struct MatchResponse {
    /// Match state.
    #[serde(rename = "match")]
    pub snapshot: MatchSnapshot,
    /// Members with resolved display names.
    pub players: Vec<PlayerSummary>,
}

impl MatchResponse {
    /// Assemble the response, matching profiles to member slots.
    pub fn assemble(record: &MatchRecord, profiles: &[ProfileRecord]) -> Self {
        let username = |id: Uuid| {
            profiles
                .iter()
                .find(|profile| profile.id == id)
                .map(|profile| profile.username.clone())
        };

        let mut players = vec![PlayerSummary {
            id: record.host_id,
            username: username(record.host_id),
            role: PlayerRole::Host,
        }];
        if let Some(opponent_id) = record.opponent_id {
            players.push(PlayerSummary {
                id: opponent_id,
                username: username(opponent_id),
                role: PlayerRole::Opponent,
            });
        }

        Self {
            snapshot: MatchSnapshot::from(record),
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_settings_are_clamped_on_conversion() {
        let input = SettingsInput {
            difficulty: Difficulty::Custom,
            total_rounds: 3,
            custom: Some(CustomBoardInput {
                width: 10,
                height: 10,
                mines: 99,
            }),
        };
        let settings = input.into_settings();
        assert_eq!(settings.custom.unwrap().mines, 35);
    }

    #[test]
    fn custom_difficulty_without_dimensions_is_rejected() {
        let missing = SettingsInput {
            difficulty: Difficulty::Custom,
            total_rounds: 3,
            custom: None,
        };
        assert!(missing.validate().is_err());

        let preset = SettingsInput {
            difficulty: Difficulty::Hard,
            total_rounds: 3,
            custom: None,
        };
        assert!(preset.validate().is_ok());
    }

    #[test]
    fn response_lists_host_before_opponent() {
        let host = Uuid::new_v4();
        let opponent = Uuid::new_v4();
        let mut record = MatchRecord::new(Uuid::new_v4(), host, MatchSettings::default(), 0);
        record.opponent_id = Some(opponent);

        let profiles = vec![ProfileRecord {
            id: opponent,
            username: "kay".into(),
        }];
        let response = MatchResponse::assemble(&record, &profiles);

        assert_eq!(response.players.len(), 2);
        assert_eq!(response.players[0].id, host);
        assert_eq!(response.players[0].username, None);
        assert_eq!(response.players[1].username.as_deref(), Some("kay"));
    }
}
