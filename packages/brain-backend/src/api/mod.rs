use axum::{
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use brain_core::events::BoardChangeEvent;
use brain_core::BoardStore;
use chrono::NaiveDate;
use serde::Serialize;

mod board;
mod card;
mod events;
mod list;
mod search;
mod stats;

use crate::state::AppState;

/// Axum REST API routes.
///
///   GET    /boards                                       -> list board summaries
///   POST   /boards                                       -> create board
///   GET    /boards/:boardId                              -> full board
///   PUT    /boards/:boardId                              -> update board fields (merge)
///   DELETE /boards/:boardId                              -> delete board
///   POST   /boards/:boardId/lists                        -> create list
///   PUT    /boards/:boardId/lists/:listId                -> update list fields (merge)
///   DELETE /boards/:boardId/lists/:listId                -> delete list and its cards
///   POST   /boards/:boardId/lists/:listId/move           -> reorder list
///   POST   /boards/:boardId/lists/:listId/cards          -> create card at end of list
///   PUT    /boards/:boardId/cards/:cardId                -> update card fields (merge)
///   DELETE /boards/:boardId/cards/:cardId                -> delete card
///   POST   /boards/:boardId/cards/:cardId/move           -> move card within/between lists
///   POST   /boards/:boardId/cards/:cardId/comments       -> add comment
///   POST   /boards/:boardId/cards/:cardId/checklist      -> add checklist item
///   POST   /boards/:boardId/cards/:cardId/checklist/:itemId/toggle -> toggle item
///   DELETE /boards/:boardId/cards/:cardId/checklist/:itemId        -> remove item
///   GET    /boards/:boardId/gantt                        -> timeline of dated cards
///   GET    /boards/:boardId/burndown?start=&end=         -> burndown series
///   GET    /boards/:boardId/dashboard                    -> board summary counts
///   GET    /search?q=term                                -> search cards
///   GET    /events                                       -> SSE stream of board changes
///   GET    /status                                       -> health check (+ store error)
///   POST   /reload                                       -> re-read storage, clear error
///   POST   /clear-error                                  -> acknowledge a store error
///   GET    /logs                                         -> recent backend log entries
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/boards", get(board::list_boards).post(board::create_board))
        .route(
            "/boards/{board_id}",
            get(board::get_board)
                .put(board::update_board)
                .delete(board::delete_board),
        )
        .route("/boards/{board_id}/lists", post(list::create_list))
        .route(
            "/boards/{board_id}/lists/{list_id}",
            put(list::update_list).delete(list::delete_list),
        )
        .route("/boards/{board_id}/lists/{list_id}/move", post(list::move_list))
        .route("/boards/{board_id}/lists/{list_id}/cards", post(card::create_card))
        .route(
            "/boards/{board_id}/cards/{card_id}",
            put(card::update_card).delete(card::delete_card),
        )
        .route("/boards/{board_id}/cards/{card_id}/move", post(card::move_card))
        .route(
            "/boards/{board_id}/cards/{card_id}/comments",
            post(card::add_comment),
        )
        .route(
            "/boards/{board_id}/cards/{card_id}/checklist",
            post(card::add_checklist_item),
        )
        .route(
            "/boards/{board_id}/cards/{card_id}/checklist/{item_id}/toggle",
            post(card::toggle_checklist_item),
        )
        .route(
            "/boards/{board_id}/cards/{card_id}/checklist/{item_id}",
            axum::routing::delete(card::remove_checklist_item),
        )
        .route("/boards/{board_id}/gantt", get(stats::gantt))
        .route("/boards/{board_id}/burndown", get(stats::burndown))
        .route("/boards/{board_id}/dashboard", get(stats::dashboard))
        .route("/search", get(search::search))
        .route("/events", get(events::sse_events))
        .route("/status", get(events::status))
        .route("/reload", post(events::reload))
        .route("/clear-error", post(events::clear_error))
        .route("/logs", get(events::list_logs))
}

// ── Shared types and helpers used across sub-modules ────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn log_api_issue(status: StatusCode, target: &'static str, message: impl AsRef<str>) {
    let message = message.as_ref();
    if status.is_server_error() {
        log::error!(target: target, "{}", message);
    } else {
        log::warn!(target: target, "{}", message);
    }
}

fn api_error(status: StatusCode, target: &'static str, error: String) -> ApiError {
    log_api_issue(status, target, &error);
    (status, Json(ErrorResponse { error }))
}

fn not_found(target: &'static str, error: String) -> ApiError {
    api_error(StatusCode::NOT_FOUND, target, error)
}

fn require_non_empty(target: &'static str, field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            target,
            format!("Missing or empty {}", field),
        ));
    }
    Ok(())
}

/// Calendar day used for date-relative answers (overdue, due soon, burndown).
fn today() -> NaiveDate {
    brain_core::dates::now().date_naive()
}

/// Success body for an applied mutation.
///
/// The mutation stays applied even when the write failed; the failure is
/// reported as `storeError` and broadcast to event subscribers.
fn applied(
    state: &AppState,
    store: &BoardStore,
    event: BoardChangeEvent,
    mut body: serde_json::Value,
) -> Json<serde_json::Value> {
    state.emit(event);
    if let Some(obj) = body.as_object_mut() {
        obj.insert("success".to_string(), serde_json::Value::Bool(true));
        if let Some(error) = store.last_error() {
            obj.insert(
                "storeError".to_string(),
                serde_json::Value::String(error.to_string()),
            );
        }
    }
    if let Some(error) = store.last_error() {
        state.emit(BoardChangeEvent::PersistFailed {
            message: error.to_string(),
        });
    }
    Json(body)
}

#[cfg(test)]
pub(crate) mod test_support {
    use brain_core::storage::memory::MemorySlot;
    use brain_core::storage::DEFAULT_BOARD_ID;
    use brain_core::BoardStore;

    use crate::state::AppState;

    pub const BOARD: &str = DEFAULT_BOARD_ID;

    pub fn state() -> AppState {
        AppState::new(BoardStore::open(Box::new(MemorySlot::new())), 0, "127.0.0.1")
    }

    /// A state whose slot only fits a small snapshot, so larger writes fail.
    pub fn failing_state() -> AppState {
        let store = BoardStore::open(Box::new(MemorySlot::with_quota(2048)));
        AppState::new(store, 0, "127.0.0.1")
    }
}
