//! SSE stream handler
//!
//! Pushes [`shared::SyncPayload`]s to connected presentation sessions
//! so they refresh without polling. A session that lags simply misses
//! the skipped payloads; the version field lets it detect the gap.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::broadcast;

use crate::auth::CurrentUser;
use crate::core::ServerState;

/// GET /api/events
pub async fn stream(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(account = %user.id, "Session subscribed to live updates");
    let rx = state.subscribe_sessions();

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(payload) => match Event::default()
                    .event(payload.resource.clone())
                    .json_data(&payload)
                {
                    Ok(event) => return Some((Ok(event), rx)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to encode sync payload");
                        continue;
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Session lagged behind live updates");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
