use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use brain_core::events::BoardChangeEvent;
use brain_core::types::{BoardUpdate, KanbanBoard, NewBoard};

use super::{applied, not_found, require_non_empty, ApiError};
use crate::state::AppState;

pub async fn list_boards(State(state): State<AppState>) -> Json<serde_json::Value> {
    let boards = state.store().board_infos();
    Json(serde_json::json!({ "boards": boards }))
}

pub async fn create_board(
    State(state): State<AppState>,
    Json(body): Json<NewBoard>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_non_empty("brain.api.create_board", "title", &body.title)?;

    let mut store = state.store();
    let board_id = store.create_board(body);
    log::info!("[brain.api] Created board {}", board_id);
    let response = applied(
        &state,
        &store,
        BoardChangeEvent::BoardCreated {
            board_id: board_id.clone(),
        },
        serde_json::json!({ "id": board_id }),
    );
    Ok((StatusCode::CREATED, response))
}

pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<KanbanBoard>, ApiError> {
    state
        .store()
        .board(&board_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("brain.api.get_board", format!("Board not found: {}", board_id)))
}

pub async fn update_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(body): Json<BoardUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.update_board(&board_id, body) {
        return Err(not_found(
            "brain.api.update_board",
            format!("Board not found: {}", board_id),
        ));
    }
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({}),
    ))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.delete_board(&board_id) {
        return Err(not_found(
            "brain.api.delete_board",
            format!("Board not found: {}", board_id),
        ));
    }
    log::info!("[brain.api] Deleted board {}", board_id);
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardDeleted { board_id },
        serde_json::json!({}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{self, BOARD};

    #[tokio::test]
    async fn test_list_boards_has_default() {
        let state = test_support::state();
        let Json(body) = list_boards(State(state)).await;
        let boards = body["boards"].as_array().unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0]["id"], BOARD);
        assert_eq!(boards[0]["lists"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_create_then_get_board() {
        let state = test_support::state();
        let mut events = state.event_tx.subscribe();
        let body: NewBoard = serde_json::from_value(serde_json::json!({
            "title": "Side project",
            "isPublic": true
        }))
        .unwrap();

        let (status, Json(created)) = create_board(State(state.clone()), Json(body)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["success"], true);
        assert!(created.get("storeError").is_none());
        let id = created["id"].as_str().unwrap().to_string();

        let Json(board) = get_board(State(state.clone()), Path(id.clone())).await.unwrap();
        assert_eq!(board.title, "Side project");
        assert!(board.is_public);
        assert_eq!(
            events.try_recv().unwrap(),
            BoardChangeEvent::BoardCreated { board_id: id }
        );
    }

    #[tokio::test]
    async fn test_create_board_requires_title() {
        let state = test_support::state();
        let err = create_board(State(state), Json(NewBoard::default()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_board_is_not_found() {
        let state = test_support::state();
        let err = get_board(State(state.clone()), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let err = update_board(
            State(state.clone()),
            Path("nope".to_string()),
            Json(BoardUpdate::default()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);

        let err = delete_board(State(state), Path("nope".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_and_delete_board() {
        let state = test_support::state();
        let update: BoardUpdate =
            serde_json::from_value(serde_json::json!({ "title": "Renamed" })).unwrap();
        update_board(State(state.clone()), Path(BOARD.to_string()), Json(update))
            .await
            .unwrap();
        assert_eq!(state.store().board(BOARD).unwrap().title, "Renamed");

        delete_board(State(state.clone()), Path(BOARD.to_string()))
            .await
            .unwrap();
        assert!(state.store().boards().is_empty());
    }
}
