//! Local reconciliation of the shared match record.
//!
//! A client holds one [`MatchView`] per match and feeds it every record
//! it receives, whether from a poll or from the change feed. The view
//! keeps the freshest record and reports which edges fired, so UI code
//! reacts to transitions instead of re-deriving them from raw state.

use uuid::Uuid;

use crate::dao::models::{MatchRecord, MatchStatus};

/// A transition observed between two versions of the match record.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeEvent {
    /// An opponent bound to the free slot.
    OpponentJoined(Uuid),
    /// The opponent slot was vacated.
    OpponentLeft(Uuid),
    /// The coordinator role moved to a different player.
    HostChanged {
        /// Previous host.
        from: Uuid,
        /// New host.
        to: Uuid,
    },
    /// The lifecycle status moved.
    StatusChanged {
        /// Status before the write.
        from: MatchStatus,
        /// Status after the write.
        to: MatchStatus,
    },
    /// A countdown anchor appeared or moved.
    CountdownAnchored {
        /// Wall-clock anchor, unix milliseconds.
        started_at_ms: i64,
        /// Countdown duration in seconds.
        seconds: u32,
    },
    /// The round counter advanced.
    RoundAdvanced(u32),
    /// The game finished with an optional winner.
    GameCompleted(Option<Uuid>),
    /// The host replaced the settings.
    SettingsChanged,
}

/// Client-held copy of the match record plus edge detection.
#[derive(Debug, Default)]
pub struct MatchView {
    current: Option<MatchRecord>,
}

impl MatchView {
    /// An empty view that has seen no record yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The freshest record seen so far.
    pub fn current(&self) -> Option<&MatchRecord> {
        self.current.as_ref()
    }

    /// Merge an incoming record, returning the edges that fired.
    ///
    /// Records older than the held one (by `updated_at_ms`) are stale
    /// reads and are dropped without producing edges. The first record
    /// produces no edges either; there is nothing to compare against.
    pub fn reconcile(&mut self, incoming: MatchRecord) -> Vec<EdgeEvent> {
        let Some(previous) = self.current.as_ref() else {
            self.current = Some(incoming);
            return Vec::new();
        };

        if incoming.updated_at_ms < previous.updated_at_ms {
            return Vec::new();
        }

        let mut edges = Vec::new();

        match (previous.opponent_id, incoming.opponent_id) {
            (None, Some(joined)) => edges.push(EdgeEvent::OpponentJoined(joined)),
            (Some(left), None) => edges.push(EdgeEvent::OpponentLeft(left)),
            (Some(old), Some(new)) if old != new => {
                edges.push(EdgeEvent::OpponentLeft(old));
                edges.push(EdgeEvent::OpponentJoined(new));
            }
            _ => {}
        }

        if incoming.host_id != previous.host_id {
            edges.push(EdgeEvent::HostChanged {
                from: previous.host_id,
                to: incoming.host_id,
            });
        }

        if incoming.status != previous.status {
            edges.push(EdgeEvent::StatusChanged {
                from: previous.status,
                to: incoming.status,
            });
            if incoming.status == MatchStatus::GameComplete {
                edges.push(EdgeEvent::GameCompleted(incoming.winner_id));
            }
        }

        if incoming.countdown_started_at_ms != previous.countdown_started_at_ms {
            if let (Some(started_at_ms), Some(seconds)) =
                (incoming.countdown_started_at_ms, incoming.countdown_seconds)
            {
                edges.push(EdgeEvent::CountdownAnchored {
                    started_at_ms,
                    seconds,
                });
            }
        }

        if incoming.current_round > previous.current_round {
            edges.push(EdgeEvent::RoundAdvanced(incoming.current_round));
        }

        if incoming.settings != previous.settings {
            edges.push(EdgeEvent::SettingsChanged);
        }

        self.current = Some(incoming);
        edges
    }
}
