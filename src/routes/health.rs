use crate::{error::Result, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let session = state.session()?;
    let body = json!({
        "status": "ok",
        "active_quiz": session.current().is_some(),
        "history_entries": session.history().len(),
    });
    Ok((StatusCode::OK, Json(body)))
}
