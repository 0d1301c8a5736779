//! SSE stream of sync progress events.
//!
//! The connection stays open for as long as the client listens; a sync in
//! flight keeps running whether or not anyone is subscribed, and a
//! dropped subscriber only releases its broadcast receiver.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::broadcast;

use crate::state::SharedState;

pub async fn stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.event_bus.subscribe();

    let stream = futures::stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(server_event) => {
                    let event = Event::default()
                        .event(server_event.event.clone())
                        .json_data(&server_event.payload)
                        .unwrap_or_else(|_| Event::default().event(server_event.event));
                    return Some((Ok::<Event, Infallible>(event), receiver));
                }
                // A slow consumer missed events; keep streaming the rest.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
