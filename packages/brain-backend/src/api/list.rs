use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use brain_core::events::BoardChangeEvent;
use brain_core::types::{ListUpdate, NewList};
use serde::Deserialize;

use super::{applied, not_found, require_non_empty, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MoveListBody {
    position: usize,
}

pub async fn create_list(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(body): Json<NewList>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_non_empty("brain.api.create_list", "title", &body.title)?;

    let mut store = state.store();
    let list_id = store.create_list(&board_id, body).ok_or_else(|| {
        not_found(
            "brain.api.create_list",
            format!("Board not found: {}", board_id),
        )
    })?;
    let response = applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({ "id": list_id }),
    );
    Ok((StatusCode::CREATED, response))
}

pub async fn update_list(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(String, String)>,
    Json(body): Json<ListUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.update_list(&board_id, &list_id, body) {
        return Err(not_found(
            "brain.api.update_list",
            format!("List not found: {} on board {}", list_id, board_id),
        ));
    }
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({}),
    ))
}

pub async fn delete_list(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.delete_list(&board_id, &list_id) {
        return Err(not_found(
            "brain.api.delete_list",
            format!("List not found: {} on board {}", list_id, board_id),
        ));
    }
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({}),
    ))
}

pub async fn move_list(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(String, String)>,
    Json(body): Json<MoveListBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.move_list(&board_id, &list_id, body.position) {
        return Err(not_found(
            "brain.api.move_list",
            format!("List not found: {} on board {}", list_id, board_id),
        ));
    }
    let position = store
        .board(&board_id)
        .and_then(|b| b.list(&list_id))
        .map(|l| l.position);
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({ "position": position }),
    ))
}
