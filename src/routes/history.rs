use crate::{dto::quiz_dto::HistoryResponse, error::Result, AppState};
use axum::{extract::State, response::IntoResponse, Json};

pub async fn get_history(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let session = state.session()?;
    Ok(Json(HistoryResponse::from(session.history())))
}
