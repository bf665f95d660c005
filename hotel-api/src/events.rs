use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppQuery;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/events", get(stream_events))
}

#[derive(Debug, Deserialize)]
struct StreamQuery {
    room_id: Option<Uuid>,
}

/// Server-sent stream of domain events, optionally narrowed to one room.
async fn stream_events(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<StreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.hotel.events.subscribe();
    let room_filter = query.room_id;

    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) => {
                if room_filter.is_some_and(|id| id != event.room_id()) {
                    return None;
                }
                match Event::default().event(event.kind()).json_data(&event) {
                    Ok(sse) => Some(Ok(sse)),
                    Err(e) => {
                        warn!("failed to encode event: {}", e);
                        None
                    }
                }
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "event stream lagged");
                None
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
