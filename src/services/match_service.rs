//! Match lifecycle operations.
//!
//! Every mutation is a full-record read-modify-write: the record is
//! loaded, rewritten in memory and saved back in its entirety, then
//! fanned out on the change feed. Writes are last-writer-wins;
//! `updated_at_ms` is refreshed so clients can notice conflicts.

use rand::Rng;
use uuid::Uuid;

use crate::{
    dao::{
        match_store::SlotClaim,
        models::{MatchRecord, MatchStatus},
    },
    dto::matches::{
        ClaimHostRequest, CreateMatchRequest, JoinMatchRequest, LeaveMatchRequest, MatchResponse,
        ReadyRequest, SettingsInput, StartMatchRequest, TransferHostRequest,
    },
    error::ServiceError,
    services::{feed_events, now_unix_ms},
    state::SharedState,
};

/// Open a new match lobby with the caller as host.
pub async fn create_match(
    state: &SharedState,
    request: CreateMatchRequest,
) -> Result<MatchResponse, ServiceError> {
    let settings = request
        .settings
        .map(SettingsInput::into_settings)
        .unwrap_or_default();

    let record = MatchRecord::new(Uuid::new_v4(), request.host_id, settings, now_unix_ms());
    state.store().save_match(record.clone()).await?;

    assemble(state, record).await
}

/// Fetch the current state of a match.
pub async fn get_match(state: &SharedState, id: Uuid) -> Result<MatchResponse, ServiceError> {
    let record = require_match(state, id).await?;
    assemble(state, record).await
}

/// Bind the caller to the free opponent slot.
///
/// Rejoining members get the current state back unchanged, so a client
/// retrying after a dropped response converges instead of erroring.
pub async fn join_match(
    state: &SharedState,
    id: Uuid,
    request: JoinMatchRequest,
) -> Result<MatchResponse, ServiceError> {
    let claim = state
        .store()
        .claim_opponent_slot(id, request.user_id, now_unix_ms())
        .await?;

    let record = match claim {
        SlotClaim::Claimed(record) => {
            feed_events::publish_match_changed(state, &record);
            record
        }
        SlotClaim::AlreadyMember(record) => record,
        SlotClaim::Occupied => return Err(ServiceError::MatchFull),
        SlotClaim::NotJoinable(status) => return Err(ServiceError::NotJoinable(status)),
        SlotClaim::Missing => return Err(ServiceError::NotFound(format!("match `{id}`"))),
    };

    assemble(state, record).await
}

/// Toggle the opponent's lobby readiness.
pub async fn set_ready(
    state: &SharedState,
    id: Uuid,
    request: ReadyRequest,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, request.user_id).await?;

    if request.user_id == record.host_id {
        return Err(ServiceError::InvalidState(
            "the host does not toggle readiness; readiness belongs to the opponent".into(),
        ));
    }
    if !record.status.is_pre_game() {
        return Err(ServiceError::InvalidState(format!(
            "readiness cannot change in status {:?}",
            record.status
        )));
    }

    record.status = if request.ready {
        MatchStatus::Ready
    } else {
        MatchStatus::Waiting
    };
    record.updated_at_ms = now_unix_ms();

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    assemble(state, record).await
}

/// Replace the match settings. Host only, lobby only.
pub async fn update_settings(
    state: &SharedState,
    id: Uuid,
    user_id: Uuid,
    input: SettingsInput,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, user_id).await?;

    if user_id != record.host_id {
        return Err(ServiceError::Unauthorized(
            "only the host may change settings".into(),
        ));
    }
    if !record.status.is_pre_game() {
        return Err(ServiceError::InvalidState(format!(
            "settings are frozen in status {:?}",
            record.status
        )));
    }

    record.settings = input.into_settings();
    record.updated_at_ms = now_unix_ms();

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    assemble(state, record).await
}

/// Start the match: seed the boards and anchor the round-one countdown.
pub async fn start_match(
    state: &SharedState,
    id: Uuid,
    request: StartMatchRequest,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, request.user_id).await?;

    if request.user_id != record.host_id {
        return Err(ServiceError::Unauthorized(
            "only the host may start the match".into(),
        ));
    }
    if record.status != MatchStatus::Ready {
        return Err(ServiceError::InvalidState(format!(
            "match cannot start in status {:?}; the opponent must be joined and ready",
            record.status
        )));
    }

    let now = now_unix_ms();
    record.board_seed = Some(request.board_seed.unwrap_or_else(|| rand::rng().random()));
    record.status = MatchStatus::Countdown;
    record.countdown_started_at_ms = Some(now);
    record.countdown_seconds = Some(state.config().countdown_seconds);
    record.updated_at_ms = now;

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    feed_events::publish_countdown_started(state, &record);
    assemble(state, record).await
}

/// Hand the coordinator role to the opponent without anyone leaving.
pub async fn transfer_host(
    state: &SharedState,
    id: Uuid,
    request: TransferHostRequest,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, request.user_id).await?;

    if request.user_id != record.host_id {
        return Err(ServiceError::Unauthorized(
            "only the current host may transfer the role".into(),
        ));
    }
    let Some(opponent_id) = record.opponent_id else {
        return Err(ServiceError::InvalidState(
            "no opponent to transfer the host role to".into(),
        ));
    };

    record.opponent_id = Some(record.host_id);
    record.host_id = opponent_id;
    record.updated_at_ms = now_unix_ms();

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    assemble(state, record).await
}

/// Promote the opponent to host after the previous host went away.
///
/// In the lobby the old host's slot is freed so a new player can join.
/// Once play has begun there is nobody left to play against, so the
/// claim forfeits the match to the claimer just like a departure.
pub async fn claim_host(
    state: &SharedState,
    id: Uuid,
    request: ClaimHostRequest,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, request.user_id).await?;

    if record.opponent_id != Some(request.user_id) {
        return Err(ServiceError::Unauthorized(
            "only the bound opponent may claim the host role".into(),
        ));
    }

    record.host_id = request.user_id;
    record.opponent_id = None;
    if record.status.is_pre_game() {
        record.status = MatchStatus::Waiting;
    } else if record.status != MatchStatus::GameComplete {
        record.winner_id = Some(request.user_id);
        record.status = MatchStatus::GameComplete;
    }
    record.updated_at_ms = now_unix_ms();

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    if record.status == MatchStatus::GameComplete {
        state.feed().forget(record.match_id);
    }
    assemble(state, record).await
}

/// Record a deliberate departure.
///
/// In the lobby the remaining player keeps the match open; once play
/// has begun a departure forfeits and the other player wins.
pub async fn leave_match(
    state: &SharedState,
    id: Uuid,
    request: LeaveMatchRequest,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, request.user_id).await?;
    let leaver = request.user_id;
    let remaining = if leaver == record.host_id {
        record.opponent_id
    } else {
        Some(record.host_id)
    };

    match remaining {
        Some(other) if !record.status.is_pre_game() && record.status != MatchStatus::GameComplete =>
        {
            record.winner_id = Some(other);
            record.status = MatchStatus::GameComplete;
            record.host_id = other;
            record.opponent_id = None;
        }
        Some(other) => {
            record.host_id = other;
            record.opponent_id = None;
            if record.status.is_pre_game() {
                record.status = MatchStatus::Waiting;
            }
        }
        None => {
            // Lobby abandoned before anyone joined.
            record.status = MatchStatus::GameComplete;
        }
    }
    record.updated_at_ms = now_unix_ms();

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    if record.status == MatchStatus::GameComplete {
        state.feed().forget(record.match_id);
    }
    assemble(state, record).await
}

pub(crate) async fn require_match(
    state: &SharedState,
    id: Uuid,
) -> Result<MatchRecord, ServiceError> {
    match state.store().find_match(id).await? {
        Some(record) => Ok(record),
        None => Err(ServiceError::NotFound(format!("match `{id}`"))),
    }
}

pub(crate) async fn require_member(
    state: &SharedState,
    id: Uuid,
    user_id: Uuid,
) -> Result<MatchRecord, ServiceError> {
    let record = require_match(state, id).await?;
    if !record.is_member(user_id) {
        return Err(ServiceError::Unauthorized(format!(
            "user `{user_id}` is not a member of match `{id}`"
        )));
    }
    Ok(record)
}

pub(crate) async fn assemble(
    state: &SharedState,
    record: MatchRecord,
) -> Result<MatchResponse, ServiceError> {
    let mut ids = vec![record.host_id];
    ids.extend(record.opponent_id);
    let profiles = state.store().find_profiles(ids).await?;
    Ok(MatchResponse::assemble(&record, &profiles))
}
