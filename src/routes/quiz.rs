use crate::{
    dto::quiz_dto::{
        GenerateQuizPayload, GenerateQuizResponse, QuizView, SaveAnswerPayload, SubmitQuizPayload,
    },
    error::{Error, Result},
    models::quiz::{QuestionCount, QuestionType},
    services::quiz_generator_service::{GenerationOutput, GenerationSource},
    AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

/// Installs a freshly generated quiz as the session's current quiz.
fn install_quiz(state: &AppState, output: GenerationOutput) -> Result<GenerateQuizResponse> {
    let mut session = state.session()?;
    session.start_quiz(output.quiz);
    let active = session
        .current()
        .ok_or_else(|| Error::Internal("quiz missing right after install".to_string()))?;

    Ok(GenerateQuizResponse {
        quiz: QuizView::from(active),
        raw_response: output.raw_response,
        warnings: output.warnings,
    })
}

#[axum::debug_handler]
pub async fn generate_quiz(
    State(state): State<AppState>,
    Json(payload): Json<GenerateQuizPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let source = payload.source()?;
    let count = QuestionCount::try_from(payload.num_questions)?;

    let output = state
        .quiz_generator
        .generate_from(&source, count, payload.question_type)
        .await?;

    let response = install_quiz(&state, output)?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn upload_quiz(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut file: Option<(String, bytes::Bytes)> = None;
    let mut num_questions = QuestionCount::DEFAULT;
    let mut question_type = QuestionType::MultipleChoice;
    let mut topic: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| Error::BadRequest("Uploaded file has no name".to_string()))?;
                let data = field.bytes().await?;
                file = Some((filename, data));
            }
            "num_questions" => {
                let raw = field.text().await?;
                num_questions = raw.trim().parse().map_err(|_| {
                    Error::BadRequest(format!("Invalid num_questions: {}", raw))
                })?;
            }
            "question_type" => {
                question_type = field.text().await?.parse().map_err(Error::BadRequest)?;
            }
            "topic" => topic = Some(field.text().await?),
            other => tracing::debug!(field = other, "Ignoring unknown upload field"),
        }
    }

    let (filename, data) =
        file.ok_or_else(|| Error::BadRequest("Please upload a PDF or DOCX file".to_string()))?;
    let count = QuestionCount::try_from(num_questions)?;

    tracing::info!(filename = %filename, bytes = data.len(), "Processing uploaded document");
    let text = state.extraction_service.extract(&filename, &data).await?;
    let source = GenerationSource::document(text, topic.as_deref());

    let output = state
        .quiz_generator
        .generate_from(&source, count, question_type)
        .await?;

    let response = install_quiz(&state, output)?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_quiz(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let session = state.session()?;
    let active = session
        .current()
        .ok_or_else(|| Error::NotFound("No quiz generated yet".to_string()))?;
    Ok(Json(QuizView::from(active)))
}

pub async fn save_answer(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(payload): Json<SaveAnswerPayload>,
) -> Result<impl IntoResponse> {
    let mut session = state.session()?;
    session.record_answer(index, payload.answer)?;
    let active = session.current().ok_or(Error::NoActiveQuiz)?;
    Ok(Json(QuizView::from(active)))
}

/// An empty body submits the answers saved so far. Any other body must parse.
pub async fn submit_quiz(
    State(state): State<AppState>,
    body: bytes::Bytes,
) -> Result<impl IntoResponse> {
    let payload: Option<SubmitQuizPayload> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        Some(serde_json::from_slice(&body)?)
    };

    let mut session = state.session()?;
    if let Some(answers) = payload.and_then(|p| p.answers) {
        session.record_answers(answers)?;
    }
    let submission = session.submit()?;
    Ok(Json(submission))
}
