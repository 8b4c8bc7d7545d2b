use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use brain_core::stats::{self, BoardSummary, Burndown};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{api_error, not_found, today, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BurndownQuery {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

fn board_not_found(target: &'static str, board_id: &str) -> ApiError {
    not_found(target, format!("Board not found: {}", board_id))
}

/// `chart` is null when no card on the board carries a date.
pub async fn gantt(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = state.store();
    let board = store
        .board(&board_id)
        .ok_or_else(|| board_not_found("brain.api.gantt", &board_id))?;
    let chart = stats::gantt(board.all_cards(), today());
    Ok(Json(serde_json::json!({ "boardId": board_id, "chart": chart })))
}

/// Explicit windows must not be inverted and must fit `MAX_WINDOW_DAYS`.
fn check_window(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if end < start || (end - start).num_days() >= stats::MAX_WINDOW_DAYS {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "brain.api.burndown",
            format!(
                "Invalid burndown window {}..{} (at most {} days, end not before start)",
                start,
                end,
                stats::MAX_WINDOW_DAYS
            ),
        ));
    }
    Ok(())
}

/// Without an explicit `start`/`end` window the board's own date span is used.
pub async fn burndown(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Query(params): Query<BurndownQuery>,
) -> Result<Json<Burndown>, ApiError> {
    if let (Some(start), Some(end)) = (params.start, params.end) {
        check_window(start, end)?;
    }
    let store = state.store();
    let board = store
        .board(&board_id)
        .ok_or_else(|| board_not_found("brain.api.burndown", &board_id))?;
    let today = today();
    let result = match (params.start, params.end) {
        (Some(start), Some(end)) => stats::burndown(board.all_cards(), start, end, today),
        _ => stats::board_burndown(board, today),
    };
    Ok(Json(result))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<BoardSummary>, ApiError> {
    let store = state.store();
    let board = store
        .board(&board_id)
        .ok_or_else(|| board_not_found("brain.api.dashboard", &board_id))?;
    Ok(Json(stats::summarize(board, today())))
}
