pub mod health;
pub mod history;
pub mod quiz;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/api/quiz", get(quiz::get_quiz))
        .route("/api/quiz/generate", post(quiz::generate_quiz))
        .route("/api/quiz/upload", post(quiz::upload_quiz))
        .route("/api/quiz/answers/:index", put(quiz::save_answer))
        .route("/api/quiz/submit", post(quiz::submit_quiz))
        .route("/api/history", get(history::get_history))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
}
