//! Builders that turn store writes into change-feed events.

use tracing::warn;

use crate::{
    dao::models::{MatchRecord, RoundProgressRecord},
    dto::{
        matches::MatchSnapshot,
        progress::ProgressSnapshot,
        sse::{CountdownStartedEvent, MatchChangedEvent, MatchEvent, ProgressChangedEvent},
    },
    state::SharedState,
};

/// Fan out the new match state to subscribers of its stream.
pub fn publish_match_changed(state: &SharedState, record: &MatchRecord) {
    let payload = MatchChangedEvent {
        snapshot: MatchSnapshot::from(record),
    };
    publish(state, record.match_id, "match_changed", &payload);
}

/// Fan out a freshly written progress row.
pub fn publish_progress_changed(state: &SharedState, record: &RoundProgressRecord) {
    let payload = ProgressChangedEvent {
        row: ProgressSnapshot::from(record),
    };
    publish(state, record.match_id, "progress_changed", &payload);
}

/// Announce a countdown anchor so every client starts ticking from the
/// same wall-clock instant.
pub fn publish_countdown_started(state: &SharedState, record: &MatchRecord) {
    let (Some(started_at_ms), Some(seconds)) =
        (record.countdown_started_at_ms, record.countdown_seconds)
    else {
        return;
    };
    let payload = CountdownStartedEvent {
        round: record.current_round,
        started_at_ms,
        seconds,
    };
    publish(state, record.match_id, "countdown_started", &payload);
}

fn publish<T: serde::Serialize>(
    state: &SharedState,
    match_id: uuid::Uuid,
    event: &str,
    payload: &T,
) {
    match MatchEvent::json(event.to_string(), payload) {
        Ok(event) => state.feed().publish(match_id, event),
        Err(err) => warn!(%match_id, error = %err, "failed to serialise feed event"),
    }
}
