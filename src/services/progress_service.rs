//! Round progress aggregation, countdown kickoff and completion
//! detection.
//!
//! Progress rows are per-player upserts, so concurrent reporters never
//! conflict. Round advancement is detected after terminal writes by
//! re-reading the round's rows; both clients can run the same check and
//! converge on the same next state because every decision here is a
//! pure function of the stored rows.

use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{MatchRecord, MatchStatus, ProgressStatus, RoundProgressRecord},
    dto::{
        matches::MatchResponse,
        progress::{ProgressReportRequest, ProgressSnapshot, RoundProgressResponse},
    },
    error::ServiceError,
    services::{
        feed_events,
        match_service::{assemble, require_match, require_member},
        now_unix_ms,
    },
    state::SharedState,
};

/// Post a zero-progress readiness row for the upcoming round.
///
/// When both players' rows are present the countdown is anchored by
/// whichever write arrived second; the state converges either way.
pub async fn mark_round_ready(
    state: &SharedState,
    id: Uuid,
    user_id: Uuid,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, user_id).await?;

    if !record.status.accepts_round_ready() {
        return Err(ServiceError::InvalidState(format!(
            "round readiness cannot be posted in status {:?}",
            record.status
        )));
    }

    let now = now_unix_ms();
    let round = record.current_round;
    let existing = state.store().list_round_progress(id, round).await?;
    let already_posted = existing
        .iter()
        .any(|row| row.user_id == user_id && row.status != ProgressStatus::Waiting);
    if already_posted {
        return Err(ServiceError::InvalidState(
            "round already underway for this player".into(),
        ));
    }

    let row = RoundProgressRecord::initial(id, round, user_id, now);
    state.store().upsert_round_progress(row.clone()).await?;
    feed_events::publish_progress_changed(state, &row);

    if record.status == MatchStatus::RoundComplete {
        let rows = state.store().list_round_progress(id, round).await?;
        if both_posted(&record, &rows) {
            record.status = MatchStatus::Countdown;
            record.countdown_started_at_ms = Some(now);
            record.countdown_seconds = Some(state.config().countdown_seconds);
            record.updated_at_ms = now;

            state.store().save_match(record.clone()).await?;
            feed_events::publish_match_changed(state, &record);
            feed_events::publish_countdown_started(state, &record);
        }
    }

    assemble(state, record).await
}

/// Flip the match from countdown to playing once the countdown has
/// elapsed on the caller's clock. Idempotent: the second caller finds
/// the match already playing and gets the current state back.
pub async fn start_round(
    state: &SharedState,
    id: Uuid,
    user_id: Uuid,
) -> Result<MatchResponse, ServiceError> {
    let mut record = require_member(state, id, user_id).await?;

    match record.status {
        MatchStatus::Playing => {}
        MatchStatus::Countdown => {
            record.status = MatchStatus::Playing;
            record.updated_at_ms = now_unix_ms();
            state.store().save_match(record.clone()).await?;
            feed_events::publish_match_changed(state, &record);
        }
        other => {
            return Err(ServiceError::InvalidState(format!(
                "round cannot start in status {other:?}"
            )));
        }
    }

    assemble(state, record).await
}

/// Record a progress report for the current round.
///
/// Non-terminal reports are cosmetic mirror updates: a failed write is
/// logged and swallowed so a flaky store never interrupts play.
/// Terminal reports must land, and trigger the completion check.
pub async fn report_progress(
    state: &SharedState,
    id: Uuid,
    request: ProgressReportRequest,
) -> Result<ProgressSnapshot, ServiceError> {
    let record = require_member(state, id, request.user_id).await?;

    if record.status != MatchStatus::Playing {
        return Err(ServiceError::InvalidState(format!(
            "progress cannot be reported in status {:?}",
            record.status
        )));
    }

    let round = record.current_round;
    let existing = state.store().list_round_progress(id, round).await?;
    if let Some(row) = existing
        .iter()
        .find(|row| row.user_id == request.user_id && row.status.is_terminal())
    {
        // Terminal rows never change again; a duplicate report is a
        // retry, not a conflict.
        return Ok(ProgressSnapshot::from(row));
    }

    let row = RoundProgressRecord {
        match_id: id,
        round,
        user_id: request.user_id,
        percent_revealed: request.percent_revealed.clamp(0.0, 1.0),
        time_elapsed_s: request.time_elapsed_s,
        status: request.status,
        updated_at_ms: now_unix_ms(),
    };

    match state.store().upsert_round_progress(row.clone()).await {
        Ok(()) => {}
        Err(err) if !row.status.is_terminal() => {
            warn!(match_id = %id, error = %err, "dropping non-terminal progress write");
            return Ok(ProgressSnapshot::from(&row));
        }
        Err(err) => return Err(err.into()),
    }
    feed_events::publish_progress_changed(state, &row);

    if row.status.is_terminal() {
        try_complete_round(state, record).await?;
    }

    Ok(ProgressSnapshot::from(&row))
}

/// List the progress rows for one round of a match.
pub async fn get_round_progress(
    state: &SharedState,
    id: Uuid,
    round: Option<u32>,
) -> Result<RoundProgressResponse, ServiceError> {
    let record = require_match(state, id).await?;
    let round = round.unwrap_or(record.current_round);
    let rows = state.store().list_round_progress(id, round).await?;

    Ok(RoundProgressResponse {
        round,
        rows: rows.iter().map(ProgressSnapshot::from).collect(),
    })
}

/// Advance the match once both players have a terminal row for the
/// current round.
async fn try_complete_round(
    state: &SharedState,
    mut record: MatchRecord,
) -> Result<(), ServiceError> {
    let Some(opponent_id) = record.opponent_id else {
        return Ok(());
    };
    let rows = state
        .store()
        .list_round_progress(record.match_id, record.current_round)
        .await?;
    if !both_terminal(record.host_id, opponent_id, &rows) {
        return Ok(());
    }

    let now = now_unix_ms();
    if record.current_round < record.settings.total_rounds {
        record.current_round += 1;
        record.status = MatchStatus::RoundComplete;
    } else {
        let mut rounds = Vec::with_capacity(record.settings.total_rounds as usize);
        for round in 1..=record.settings.total_rounds {
            rounds.push(
                state
                    .store()
                    .list_round_progress(record.match_id, round)
                    .await?,
            );
        }
        record.winner_id = Some(match_winner(record.host_id, opponent_id, &rounds));
        record.status = MatchStatus::GameComplete;
    }
    record.countdown_started_at_ms = None;
    record.countdown_seconds = None;
    record.updated_at_ms = now;

    state.store().save_match(record.clone()).await?;
    feed_events::publish_match_changed(state, &record);
    Ok(())
}

fn both_posted(record: &MatchRecord, rows: &[RoundProgressRecord]) -> bool {
    let Some(opponent_id) = record.opponent_id else {
        return false;
    };
    let posted = |user: Uuid| rows.iter().any(|row| row.user_id == user);
    posted(record.host_id) && posted(opponent_id)
}

/// Whether both players have finished the round, one way or the other.
pub fn both_terminal(host_id: Uuid, opponent_id: Uuid, rows: &[RoundProgressRecord]) -> bool {
    let done = |user: Uuid| {
        rows.iter()
            .any(|row| row.user_id == user && row.status.is_terminal())
    };
    done(host_id) && done(opponent_id)
}

/// Decide who came out ahead in a single round, for results display.
///
/// A win beats a loss; two wins compare clear times; two losses compare
/// how far each player got. Exact ties have no winner. This is a
/// presentation verdict only; [`match_winner`] scores cleared rounds
/// directly.
pub fn round_winner(rows: &[RoundProgressRecord]) -> Option<Uuid> {
    let terminal: Vec<&RoundProgressRecord> =
        rows.iter().filter(|row| row.status.is_terminal()).collect();
    let [a, b] = terminal.as_slice() else {
        return None;
    };

    match (a.status, b.status) {
        (ProgressStatus::Won, ProgressStatus::Lost) => Some(a.user_id),
        (ProgressStatus::Lost, ProgressStatus::Won) => Some(b.user_id),
        (ProgressStatus::Won, ProgressStatus::Won) => {
            if a.time_elapsed_s < b.time_elapsed_s {
                Some(a.user_id)
            } else if b.time_elapsed_s < a.time_elapsed_s {
                Some(b.user_id)
            } else {
                None
            }
        }
        _ => {
            if a.percent_revealed > b.percent_revealed {
                Some(a.user_id)
            } else if b.percent_revealed > a.percent_revealed {
                Some(b.user_id)
            } else {
                None
            }
        }
    }
}

/// Decide the overall match winner from every round's rows.
///
/// Each player's cleared rounds are counted independently: a `Won` row
/// scores whatever the opponent did in the same round, so a round can
/// score for both players or neither. Cumulative clear time breaks a
/// tie; the lower identifier breaks a dead heat so both clients always
/// name the same winner.
pub fn match_winner(host_id: Uuid, opponent_id: Uuid, rounds: &[Vec<RoundProgressRecord>]) -> Uuid {
    let cleared = |user: Uuid| -> u32 {
        rounds
            .iter()
            .flatten()
            .filter(|row| row.user_id == user && row.status == ProgressStatus::Won)
            .count() as u32
    };
    let host_wins = cleared(host_id);
    let opponent_wins = cleared(opponent_id);
    if host_wins != opponent_wins {
        return if host_wins > opponent_wins {
            host_id
        } else {
            opponent_id
        };
    }

    let total_time = |user: Uuid| -> u64 {
        rounds
            .iter()
            .flatten()
            .filter(|row| row.user_id == user && row.status.is_terminal())
            .map(|row| u64::from(row.time_elapsed_s))
            .sum()
    };
    let host_time = total_time(host_id);
    let opponent_time = total_time(opponent_id);
    if host_time != opponent_time {
        return if host_time < opponent_time {
            host_id
        } else {
            opponent_id
        };
    }

    host_id.min(opponent_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user: Uuid, status: ProgressStatus, time: u32, percent: f32) -> RoundProgressRecord {
        RoundProgressRecord {
            match_id: Uuid::nil(),
            round: 1,
            user_id: user,
            percent_revealed: percent,
            time_elapsed_s: time,
            status,
            updated_at_ms: 0,
        }
    }

    #[test]
    fn win_beats_loss_regardless_of_time() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            row(a, ProgressStatus::Won, 300, 1.0),
            row(b, ProgressStatus::Lost, 10, 0.9),
        ];
        assert_eq!(round_winner(&rows), Some(a));
    }

    #[test]
    fn double_win_goes_to_faster_clear() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            row(a, ProgressStatus::Won, 42, 1.0),
            row(b, ProgressStatus::Won, 41, 1.0),
        ];
        assert_eq!(round_winner(&rows), Some(b));
    }

    #[test]
    fn double_loss_goes_to_deeper_board() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            row(a, ProgressStatus::Lost, 42, 0.6),
            row(b, ProgressStatus::Lost, 41, 0.3),
        ];
        assert_eq!(round_winner(&rows), Some(a));
    }

    #[test]
    fn exact_round_tie_has_no_winner() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            row(a, ProgressStatus::Won, 42, 1.0),
            row(b, ProgressStatus::Won, 42, 1.0),
        ];
        assert_eq!(round_winner(&rows), None);
    }

    #[test]
    fn incomplete_round_has_no_winner() {
        let a = Uuid::new_v4();
        let rows = vec![row(a, ProgressStatus::Won, 42, 1.0)];
        assert_eq!(round_winner(&rows), None);
    }

    #[test]
    fn match_winner_counts_cleared_rounds_first() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rounds = vec![
            vec![
                row(a, ProgressStatus::Won, 100, 1.0),
                row(b, ProgressStatus::Lost, 10, 0.5),
            ],
            vec![
                row(a, ProgressStatus::Won, 100, 1.0),
                row(b, ProgressStatus::Lost, 10, 0.5),
            ],
            vec![
                row(a, ProgressStatus::Lost, 5, 0.1),
                row(b, ProgressStatus::Won, 200, 1.0),
            ],
        ];
        assert_eq!(match_winner(a, b, &rounds), a);
    }

    #[test]
    fn uncleared_rounds_score_nothing() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        // B gets further and plays faster in the double-loss round, but
        // A holds the only cleared round of the match.
        let rounds = vec![
            vec![
                row(a, ProgressStatus::Won, 100, 1.0),
                row(b, ProgressStatus::Lost, 10, 0.5),
            ],
            vec![
                row(a, ProgressStatus::Lost, 50, 0.2),
                row(b, ProgressStatus::Lost, 10, 0.9),
            ],
        ];
        assert_eq!(match_winner(a, b, &rounds), a);
    }

    #[test]
    fn both_clearing_a_round_scores_both() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        // The shared clear cancels out; B's solo clear decides it.
        let rounds = vec![
            vec![
                row(a, ProgressStatus::Won, 10, 1.0),
                row(b, ProgressStatus::Won, 90, 1.0),
            ],
            vec![
                row(a, ProgressStatus::Lost, 5, 0.3),
                row(b, ProgressStatus::Won, 60, 1.0),
            ],
        ];
        assert_eq!(match_winner(a, b, &rounds), b);
    }

    #[test]
    fn tied_round_wins_fall_back_to_cumulative_time() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rounds = vec![
            vec![
                row(a, ProgressStatus::Won, 10, 1.0),
                row(b, ProgressStatus::Lost, 50, 0.5),
            ],
            vec![
                row(a, ProgressStatus::Lost, 80, 0.5),
                row(b, ProgressStatus::Won, 20, 1.0),
            ],
        ];
        // a: 90s total, b: 70s total.
        assert_eq!(match_winner(a, b, &rounds), b);
    }

    #[test]
    fn dead_heat_resolves_to_lower_id_on_both_sides() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rounds = vec![vec![
            row(a, ProgressStatus::Won, 42, 1.0),
            row(b, ProgressStatus::Won, 42, 1.0),
        ]];
        assert_eq!(match_winner(a, b, &rounds), a.min(b));
        assert_eq!(match_winner(b, a, &rounds), a.min(b));
    }

    #[test]
    fn both_terminal_requires_each_player() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            row(a, ProgressStatus::Won, 10, 1.0),
            row(b, ProgressStatus::Playing, 10, 0.4),
        ];
        assert!(!both_terminal(a, b, &rows));
        let rows = vec![
            row(a, ProgressStatus::Won, 10, 1.0),
            row(b, ProgressStatus::Lost, 12, 0.4),
        ];
        assert!(both_terminal(a, b, &rows));
    }
}
