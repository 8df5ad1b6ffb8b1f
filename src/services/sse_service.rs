use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Subscribe to the theme SSE stream.
///
/// The handshake is queued on the returned stream only, so already connected clients
/// do not see it.
pub fn subscribe_theme(state: &SharedState) -> (ServerEvent, broadcast::Receiver<ServerEvent>) {
    let receiver = state.sse().subscribe();
    let handshake = Handshake {
        message: "theme stream connected".into(),
        themed: state.presentation().snapshot().is_themed(),
        degraded: state.is_degraded(),
    };
    let event = ServerEvent::json(Some(EVENT_HANDSHAKE.to_string()), &handshake)
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to serialize SSE handshake");
            ServerEvent::new(Some(EVENT_HANDSHAKE.to_string()), String::new())
        });
    (event, receiver)
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response, forwarding events until the client
/// disconnects.
pub fn to_sse_stream(
    first: ServerEvent,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if tx.send(Ok(to_event(first))).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            // Clients re-sync from the next full theme.applied payload.
                            debug!(skipped, "theme SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        tracing::info!("Theme SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
