use mongodb::bson::{Binary, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    MatchRecord, MatchSettings, MatchStatus, ProgressStatus, RoundProgressRecord,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    host_id: Uuid,
    opponent_id: Option<Uuid>,
    status: MatchStatus,
    current_round: u32,
    settings: MatchSettings,
    winner_id: Option<Uuid>,
    // BSON has no u64; the seed is stored with its bits reinterpreted.
    board_seed: Option<i64>,
    countdown_started_at_ms: Option<i64>,
    countdown_seconds: Option<u32>,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl From<MatchRecord> for MongoMatchDocument {
    fn from(value: MatchRecord) -> Self {
        Self {
            id: value.match_id,
            host_id: value.host_id,
            opponent_id: value.opponent_id,
            status: value.status,
            current_round: value.current_round,
            settings: value.settings,
            winner_id: value.winner_id,
            board_seed: value.board_seed.map(|seed| seed as i64),
            countdown_started_at_ms: value.countdown_started_at_ms,
            countdown_seconds: value.countdown_seconds,
            created_at_ms: value.created_at_ms,
            updated_at_ms: value.updated_at_ms,
        }
    }
}

impl From<MongoMatchDocument> for MatchRecord {
    fn from(value: MongoMatchDocument) -> Self {
        Self {
            match_id: value.id,
            host_id: value.host_id,
            opponent_id: value.opponent_id,
            status: value.status,
            current_round: value.current_round,
            settings: value.settings,
            winner_id: value.winner_id,
            board_seed: value.board_seed.map(|seed| seed as u64),
            countdown_started_at_ms: value.countdown_started_at_ms,
            countdown_seconds: value.countdown_seconds,
            created_at_ms: value.created_at_ms,
            updated_at_ms: value.updated_at_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoProgressDocument {
    match_id: Uuid,
    round: u32,
    user_id: Uuid,
    percent_revealed: f32,
    time_elapsed_s: u32,
    status: ProgressStatus,
    updated_at_ms: i64,
}

impl From<RoundProgressRecord> for MongoProgressDocument {
    fn from(value: RoundProgressRecord) -> Self {
        Self {
            match_id: value.match_id,
            round: value.round,
            user_id: value.user_id,
            percent_revealed: value.percent_revealed,
            time_elapsed_s: value.time_elapsed_s,
            status: value.status,
            updated_at_ms: value.updated_at_ms,
        }
    }
}

impl From<MongoProgressDocument> for RoundProgressRecord {
    fn from(value: MongoProgressDocument) -> Self {
        Self {
            match_id: value.match_id,
            round: value.round,
            user_id: value.user_id,
            percent_revealed: value.percent_revealed,
            time_elapsed_s: value.time_elapsed_s,
            status: value.status,
            updated_at_ms: value.updated_at_ms,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
