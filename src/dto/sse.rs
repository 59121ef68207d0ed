use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{matches::MatchSnapshot, progress::ProgressSnapshot};

#[derive(Clone, Debug)]
/// Dispatched payload carried across per-match SSE channels.
pub struct MatchEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// Serialized JSON body.
    pub data: String,
}

impl MatchEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Match the stream is scoped to.
    pub match_id: uuid::Uuid,
    /// Human-readable message confirming the subscription.
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the shared match record changes.
pub struct MatchChangedEvent {
    /// New state of the match.
    #[serde(rename = "match")]
    pub snapshot: MatchSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever a progress row is written.
pub struct ProgressChangedEvent {
    /// The row as written.
    pub row: ProgressSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the host anchors a countdown.
pub struct CountdownStartedEvent {
    /// Round the countdown precedes.
    pub round: u32,
    /// Wall-clock anchor, unix milliseconds.
    pub started_at_ms: i64,
    /// Countdown duration in seconds.
    pub seconds: u32,
}
