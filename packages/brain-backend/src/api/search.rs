use axum::{
    extract::{Query, State},
    response::Json,
};
use brain_core::search::{search_boards, SearchOptions};
use serde::Deserialize;

use super::today;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    #[serde(default, alias = "caseSensitive")]
    case_sensitive: Option<bool>,
    #[serde(default, alias = "useRegex")]
    regex: Option<bool>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<serde_json::Value> {
    let query = params.q.unwrap_or_default();
    let options = SearchOptions {
        case_sensitive: params.case_sensitive.unwrap_or(false),
        use_regex: params.regex.unwrap_or(false),
    };
    let results = search_boards(state.store().boards(), &query, options, today());
    Json(serde_json::json!({ "query": query, "results": results }))
}
