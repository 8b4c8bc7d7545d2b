use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use brain_core::events::BoardChangeEvent;
use brain_core::types::{CardUpdate, NewCard};
use serde::Deserialize;

use super::{applied, not_found, require_non_empty, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardBody {
    /// Defaults to the list currently holding the card.
    #[serde(default)]
    source_list_id: Option<String>,
    target_list_id: String,
    position: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentBody {
    text: String,
    #[serde(default = "default_author")]
    author_id: String,
}

fn default_author() -> String {
    "local".to_string()
}

#[derive(Deserialize)]
pub struct AddChecklistItemBody {
    text: String,
}

fn card_not_found(target: &'static str, board_id: &str, card_id: &str) -> ApiError {
    not_found(
        target,
        format!("Card not found: {} on board {}", card_id, board_id),
    )
}

pub async fn create_card(
    State(state): State<AppState>,
    Path((board_id, list_id)): Path<(String, String)>,
    Json(body): Json<NewCard>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_non_empty("brain.api.create_card", "title", &body.title)?;

    let mut store = state.store();
    let card_id = store.create_card(&board_id, &list_id, body).ok_or_else(|| {
        not_found(
            "brain.api.create_card",
            format!("List not found: {} on board {}", list_id, board_id),
        )
    })?;
    let response = applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({ "id": card_id }),
    );
    Ok((StatusCode::CREATED, response))
}

pub async fn update_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(String, String)>,
    Json(body): Json<CardUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.update_card(&board_id, &card_id, body) {
        return Err(card_not_found("brain.api.update_card", &board_id, &card_id));
    }
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({}),
    ))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.delete_card(&board_id, &card_id) {
        return Err(card_not_found("brain.api.delete_card", &board_id, &card_id));
    }
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({}),
    ))
}

pub async fn move_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(String, String)>,
    Json(body): Json<MoveCardBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    let source_list_id = match body.source_list_id {
        Some(id) => id,
        None => store
            .board(&board_id)
            .and_then(|b| b.card(&card_id))
            .map(|c| c.list_id.clone())
            .ok_or_else(|| card_not_found("brain.api.move_card", &board_id, &card_id))?,
    };

    if !store.move_card(
        &board_id,
        &card_id,
        &source_list_id,
        &body.target_list_id,
        body.position,
    ) {
        return Err(not_found(
            "brain.api.move_card",
            format!(
                "Cannot move card {} from {} to {} on board {}",
                card_id, source_list_id, body.target_list_id, board_id
            ),
        ));
    }

    let position = store
        .board(&board_id)
        .and_then(|b| b.card(&card_id))
        .map(|c| c.position)
        .unwrap_or(body.position);
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::CardMoved {
            board_id,
            card_id,
            from_list_id: source_list_id,
            to_list_id: body.target_list_id,
            position,
        },
        serde_json::json!({ "position": position }),
    ))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(String, String)>,
    Json(body): Json<AddCommentBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_non_empty("brain.api.add_comment", "text", &body.text)?;

    let mut store = state.store();
    let comment_id = store
        .add_comment(&board_id, &card_id, &body.text, &body.author_id)
        .ok_or_else(|| card_not_found("brain.api.add_comment", &board_id, &card_id))?;
    let response = applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({ "id": comment_id }),
    );
    Ok((StatusCode::CREATED, response))
}

pub async fn add_checklist_item(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(String, String)>,
    Json(body): Json<AddChecklistItemBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    require_non_empty("brain.api.add_checklist_item", "text", &body.text)?;

    let mut store = state.store();
    let item_id = store
        .add_checklist_item(&board_id, &card_id, &body.text)
        .ok_or_else(|| card_not_found("brain.api.add_checklist_item", &board_id, &card_id))?;
    let response = applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({ "id": item_id }),
    );
    Ok((StatusCode::CREATED, response))
}

pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((board_id, card_id, item_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    let completed = store
        .toggle_checklist_item(&board_id, &card_id, &item_id)
        .ok_or_else(|| {
            not_found(
                "brain.api.toggle_checklist_item",
                format!("Checklist item not found: {} on card {}", item_id, card_id),
            )
        })?;
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({ "completed": completed }),
    ))
}

pub async fn remove_checklist_item(
    State(state): State<AppState>,
    Path((board_id, card_id, item_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut store = state.store();
    if !store.remove_checklist_item(&board_id, &card_id, &item_id) {
        return Err(not_found(
            "brain.api.remove_checklist_item",
            format!("Checklist item not found: {} on card {}", item_id, card_id),
        ));
    }
    Ok(applied(
        &state,
        &store,
        BoardChangeEvent::BoardChanged { board_id },
        serde_json::json!({}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{self, BOARD};

    fn new_card(title: &str) -> NewCard {
        NewCard {
            title: title.to_string(),
            ..NewCard::default()
        }
    }

    async fn add(state: &AppState, list_id: &str, title: &str) -> String {
        let (_, Json(body)) = create_card(
            State(state.clone()),
            Path((BOARD.to_string(), list_id.to_string())),
            Json(new_card(title)),
        )
        .await
        .unwrap();
        body["id"].as_str().unwrap().to_string()
    }

    fn titles(state: &AppState, list_id: &str) -> Vec<String> {
        state
            .store()
            .board(BOARD)
            .unwrap()
            .list(list_id)
            .unwrap()
            .cards
            .iter()
            .map(|c| c.title.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_create_card_in_unknown_list() {
        let state = test_support::state();
        let err = create_card(
            State(state),
            Path((BOARD.to_string(), "list-nope".to_string())),
            Json(new_card("x")),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_move_card_resolves_source_list() {
        let state = test_support::state();
        let mut events = state.event_tx.subscribe();
        let a = add(&state, "list-inbox", "A").await;
        add(&state, "list-inbox", "B").await;
        add(&state, "list-today", "C").await;
        while events.try_recv().is_ok() {}

        let body = MoveCardBody {
            source_list_id: None,
            target_list_id: "list-today".to_string(),
            position: 0,
        };
        let Json(moved) = move_card(
            State(state.clone()),
            Path((BOARD.to_string(), a.clone())),
            Json(body),
        )
        .await
        .unwrap();

        assert_eq!(moved["position"], 0);
        assert_eq!(titles(&state, "list-inbox"), vec!["B"]);
        assert_eq!(titles(&state, "list-today"), vec!["A", "C"]);
        assert_eq!(
            events.try_recv().unwrap(),
            BoardChangeEvent::CardMoved {
                board_id: BOARD.to_string(),
                card_id: a,
                from_list_id: "list-inbox".to_string(),
                to_list_id: "list-today".to_string(),
                position: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_move_card_wrong_source_is_not_found() {
        let state = test_support::state();
        let a = add(&state, "list-inbox", "A").await;
        let body = MoveCardBody {
            source_list_id: Some("list-week".to_string()),
            target_list_id: "list-today".to_string(),
            position: 0,
        };
        let err = move_card(State(state.clone()), Path((BOARD.to_string(), a)), Json(body))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
        assert_eq!(titles(&state, "list-inbox"), vec!["A"]);
    }

    #[tokio::test]
    async fn test_update_and_delete_card() {
        let state = test_support::state();
        let a = add(&state, "list-inbox", "A").await;
        let update: CardUpdate =
            serde_json::from_value(serde_json::json!({ "completed": true, "priority": "high" }))
                .unwrap();
        update_card(
            State(state.clone()),
            Path((BOARD.to_string(), a.clone())),
            Json(update),
        )
        .await
        .unwrap();
        {
            let store = state.store();
            let card = store.board(BOARD).unwrap().card(&a).unwrap();
            assert!(card.completed);
            assert!(card.completed_at.is_some());
        }

        delete_card(State(state.clone()), Path((BOARD.to_string(), a.clone())))
            .await
            .unwrap();
        let err = delete_card(State(state), Path((BOARD.to_string(), a)))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_checklist_and_comments() {
        let state = test_support::state();
        let a = add(&state, "list-inbox", "A").await;

        let (_, Json(item)) = add_checklist_item(
            State(state.clone()),
            Path((BOARD.to_string(), a.clone())),
            Json(AddChecklistItemBody {
                text: "step".to_string(),
            }),
        )
        .await
        .unwrap();
        let item_id = item["id"].as_str().unwrap().to_string();

        let Json(toggled) = toggle_checklist_item(
            State(state.clone()),
            Path((BOARD.to_string(), a.clone(), item_id.clone())),
        )
        .await
        .unwrap();
        assert_eq!(toggled["completed"], true);

        let comment: AddCommentBody =
            serde_json::from_value(serde_json::json!({ "text": "looks good" })).unwrap();
        add_comment(
            State(state.clone()),
            Path((BOARD.to_string(), a.clone())),
            Json(comment),
        )
        .await
        .unwrap();

        remove_checklist_item(
            State(state.clone()),
            Path((BOARD.to_string(), a.clone(), item_id)),
        )
        .await
        .unwrap();

        let store = state.store();
        let card = store.board(BOARD).unwrap().card(&a).unwrap();
        assert!(card.checklist.is_empty());
        assert_eq!(card.comments.len(), 1);
        assert_eq!(card.comments[0].author_id, "local");
    }

    #[tokio::test]
    async fn test_store_error_reported_but_change_kept() {
        let state = test_support::failing_state();
        let mut events = state.event_tx.subscribe();
        let (status, Json(body)) = create_card(
            State(state.clone()),
            Path((BOARD.to_string(), "list-inbox".to_string())),
            Json(new_card(&"x".repeat(4096))),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["storeError"].as_str().unwrap().contains("quota"));
        assert_eq!(titles(&state, "list-inbox").len(), 1);
        assert!(matches!(
            events.try_recv().unwrap(),
            BoardChangeEvent::BoardChanged { .. }
        ));
        assert!(matches!(
            events.try_recv().unwrap(),
            BoardChangeEvent::PersistFailed { .. }
        ));
    }
}
