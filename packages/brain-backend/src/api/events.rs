use axum::{
    extract::State,
    response::{sse::Event, Json, Sse},
};
use brain_core::events::BoardChangeEvent;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::AppState;

/// SSE endpoint: streams BoardChangeEvent as JSON to connected clients.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.event_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => {
            let json = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(json)))
        }
        Err(e) => {
            log::warn!("[brain.events] SSE subscriber lagged: {}", e);
            None
        }
    });

    // Keep-alive every 30 seconds
    let stream = stream.merge(tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(
            std::time::Duration::from_secs(30),
        )),
        |_| Ok(Event::default().comment("keep-alive")),
    ));

    Sse::new(stream)
}

pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let store = state.store();
    Json(serde_json::json!({
        "status": "running",
        "port": state.port,
        "bind_address": state.bind_address,
        "boards": store.boards().len(),
        "storeError": store.last_error(),
    }))
}

/// Drop in-memory state and re-read storage. Also clears a stale-write error.
pub async fn reload(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut store = state.store();
    store.reload();
    state.emit(BoardChangeEvent::StoreReloaded);
    Json(serde_json::json!({
        "success": true,
        "boards": store.boards().len(),
        "storeError": store.last_error(),
    }))
}

/// Keep in-memory state and forget the last persistence failure.
pub async fn clear_error(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut store = state.store();
    if let Some(error) = store.last_error() {
        log::info!("[brain.api] Store error acknowledged: {}", error);
    }
    store.clear_error();
    Json(serde_json::json!({ "success": true }))
}

pub async fn list_logs() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "entries": crate::log_bridge::recent_entries(),
    }))
}
