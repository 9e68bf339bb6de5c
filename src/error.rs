use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single quiz generation call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation API error: {0}")]
    Api(String),

    /// The call succeeded but the payload could not be turned into a quiz.
    /// `raw` is the model text exactly as received.
    #[error("Malformed generation response: {reason}")]
    MalformedResponse { reason: String, raw: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("Quiz has no questions to score")]
    EmptyQuiz,

    #[error("Please answer all questions before submitting (missing: {missing:?})")]
    IncompleteAnswers { missing: Vec<usize> },
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("File content does not look like a {0} document")]
    InvalidContent(&'static str),

    #[error("Text extraction with {tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("No text could be extracted from the document")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No active quiz, generate one first")]
    NoActiveQuiz,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        let (status, body) = match self {
            Error::Generation(GenerationError::Api(_)) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": message, "kind": "api_error" }),
            ),
            Error::Generation(GenerationError::MalformedResponse { raw, .. }) => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": message,
                    "kind": "malformed_response",
                    "raw_response": raw,
                }),
            ),
            Error::Scoring(ScoringError::IncompleteAnswers { missing }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": message,
                    "kind": "incomplete_answers",
                    "missing": missing,
                }),
            ),
            Error::Scoring(ScoringError::EmptyQuiz) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "kind": "empty_quiz" }),
            ),
            Error::Extraction(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string(), "kind": "extraction_failed" }),
            ),
            Error::NoActiveQuiz => (
                StatusCode::CONFLICT,
                json!({ "error": message, "kind": "no_active_quiz" }),
            ),
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Config(_) | Error::Internal(_) => {
                tracing::error!("{}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An unexpected error occurred" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
