use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::{Handshake, MatchEvent},
    state::SharedState,
};

/// Subscribe to one match's change stream.
pub fn subscribe(state: &SharedState, match_id: Uuid) -> broadcast::Receiver<MatchEvent> {
    state.feed().subscribe(match_id)
}

/// Convert a broadcast receiver into an SSE response, forwarding events
/// and logging once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<MatchEvent>,
    match_id: Uuid,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive;
                            // the client reconciles from the store.
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!(%match_id, "match SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Confirm the subscription on the stream itself so clients know the
/// feed is live before the first real event.
pub fn broadcast_handshake(state: &SharedState, match_id: Uuid) {
    if let Ok(event) = MatchEvent::json(
        Some("connected".to_string()),
        &Handshake {
            match_id,
            message: "match stream connected".into(),
        },
    ) {
        state.feed().publish(match_id, event);
    }
}
