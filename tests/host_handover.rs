//! Host handover protocol end to end: departure flag, claim window,
//! and promotion through the coordinator.

use std::sync::Arc;

use uuid::Uuid;

use mine_duel_back::{
    config::AppConfig,
    dao::{match_store::memory::MemoryMatchStore, models::MatchStatus},
    dto::matches::{
        ClaimHostRequest, CreateMatchRequest, JoinMatchRequest, ReadyRequest, StartMatchRequest,
    },
    services::{match_service, progress_service},
    state::{AppState, SharedState},
    sync::handover::{MemoryFlagStore, consume_departure, record_departure},
};

fn app() -> SharedState {
    AppState::new(Arc::new(MemoryMatchStore::new()), AppConfig::default())
}

async fn lobby_with_two(state: &SharedState) -> (Uuid, Uuid, Uuid) {
    let host = Uuid::new_v4();
    let opponent = Uuid::new_v4();
    let created = match_service::create_match(
        state,
        CreateMatchRequest {
            host_id: host,
            settings: None,
        },
    )
    .await
    .expect("create");
    let id = created.snapshot.match_id;
    match_service::join_match(state, id, JoinMatchRequest { user_id: opponent })
        .await
        .expect("join");
    (id, host, opponent)
}

#[tokio::test]
async fn fresh_departure_promotes_the_opponent() {
    let state = app();
    let flags = MemoryFlagStore::new();
    let (id, host, opponent) = lobby_with_two(&state).await;
    let window = state.config().handover_window_secs;

    // Host's client records the flag on its way out.
    record_departure(&flags, id, host, 100_000);

    // Opponent's client notices five seconds later, inside the window.
    let flag = consume_departure(&flags, id, 105_000, window).expect("flag still fresh");
    assert_eq!(flag.host_id, host);

    let claimed = match_service::claim_host(&state, id, ClaimHostRequest { user_id: opponent })
        .await
        .expect("claim");
    assert_eq!(claimed.snapshot.host_id, opponent);
    assert_eq!(claimed.snapshot.opponent_id, None);
    assert_eq!(claimed.snapshot.status, MatchStatus::Waiting);
}

#[tokio::test]
async fn stale_departure_does_not_authorise_a_claim() {
    let state = app();
    let flags = MemoryFlagStore::new();
    let (id, host, _opponent) = lobby_with_two(&state).await;
    let window = state.config().handover_window_secs;

    record_departure(&flags, id, host, 100_000);

    // Forty seconds later the window has closed; the client treats the
    // match as abandoned and never calls the coordinator.
    assert!(consume_departure(&flags, id, 140_000, window).is_none());
}

#[tokio::test]
async fn mid_game_claim_forfeits_to_the_claimer() {
    let state = app();
    let flags = MemoryFlagStore::new();
    let (id, host, opponent) = lobby_with_two(&state).await;
    let window = state.config().handover_window_secs;

    match_service::set_ready(
        &state,
        id,
        ReadyRequest {
            user_id: opponent,
            ready: true,
        },
    )
    .await
    .expect("ready");
    match_service::start_match(
        &state,
        id,
        StartMatchRequest {
            user_id: host,
            board_seed: Some(7),
        },
    )
    .await
    .expect("start");
    progress_service::start_round(&state, id, opponent)
        .await
        .expect("start round");

    // The host vanishes mid-round; the opponent consumes the flag and
    // claims. With nobody left to play against, the match ends in a
    // forfeit instead of hanging in play forever.
    record_departure(&flags, id, host, 100_000);
    let flag = consume_departure(&flags, id, 110_000, window).expect("flag still fresh");
    assert_eq!(flag.host_id, host);

    let claimed = match_service::claim_host(&state, id, ClaimHostRequest { user_id: opponent })
        .await
        .expect("claim");
    assert_eq!(claimed.snapshot.status, MatchStatus::GameComplete);
    assert_eq!(claimed.snapshot.winner_id, Some(opponent));
    assert_eq!(claimed.snapshot.host_id, opponent);
    assert_eq!(claimed.snapshot.opponent_id, None);
}

#[tokio::test]
async fn outsiders_cannot_claim_the_host_role() {
    let state = app();
    let (id, _host, _opponent) = lobby_with_two(&state).await;

    let stranger = match_service::claim_host(
        &state,
        id,
        ClaimHostRequest {
            user_id: Uuid::new_v4(),
        },
    )
    .await;
    assert!(stranger.is_err());
}
