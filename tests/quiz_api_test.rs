use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use quiz_maker::{
    config::Config,
    error::GenerationError,
    routes,
    services::completion_client::{CompletionClient, CompletionRequest},
    AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

struct StubClient {
    reply: std::result::Result<String, GenerationError>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StubClient {
    fn replying(reply: std::result::Result<String, GenerationError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }
}

#[async_trait]
impl CompletionClient for StubClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> std::result::Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = request.messages.last().map(|m| m.content.clone());
        *self.last_prompt.lock().unwrap() = prompt;
        self.reply.clone()
    }
}

fn capitals_quiz() -> String {
    json!({
        "questions": [
            { "question": "Capital of France?", "options": ["Paris", "Lyon", "Nice", "Lille"],
              "correct_answer": "Paris", "explanation": "Paris is the capital.", "hint": "Eiffel" },
            { "question": "Capital of Italy?", "options": ["Milan", "Rome", "Turin", "Naples"],
              "correct_answer": "Rome", "explanation": "Rome is the capital.", "hint": "Colosseum" },
            { "question": "Capital of Spain?", "options": ["Madrid", "Seville", "Valencia", "Bilbao"],
              "correct_answer": "Madrid", "explanation": "Madrid is the capital.", "hint": "Prado" },
            { "question": "Capital of Germany?", "options": ["Munich", "Berlin", "Hamburg", "Bonn"],
              "correct_answer": "Berlin", "explanation": "Berlin is the capital.", "hint": "Wall" }
        ]
    })
    .to_string()
}

fn setup_app(client: Arc<StubClient>) -> Router {
    let state = AppState::with_client(client, &Config::for_tests());
    routes::router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn generate_capitals(app: &Router) -> JsonValue {
    let (status, body) = send(
        app,
        "POST",
        "/api/quiz/generate",
        Some(json!({ "topic": "European capitals", "num_questions": 4, "question_type": "multiple_choice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let app = setup_app(StubClient::replying(Ok(capitals_quiz())));
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn generate_answer_submit_and_history() {
    let client = StubClient::replying(Ok(capitals_quiz()));
    let app = setup_app(client.clone());

    let body = generate_capitals(&app).await;
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(body["quiz"]["total_questions"], 4);
    assert_eq!(body["raw_response"], capitals_quiz());
    assert_eq!(body["quiz"]["questions"][1]["question"], "Capital of Italy?");
    assert_eq!(body["quiz"]["questions"][0]["hint"], "Eiffel");
    assert!(body["quiz"]["questions"][0].get("correct_answer").is_none());
    let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("European capitals"));

    for (index, answer) in [(0, "Paris"), (1, "Milan"), (2, "Madrid"), (3, "berlin")] {
        let (status, view) = send(
            &app,
            "PUT",
            &format!("/api/quiz/answers/{}", index),
            Some(json!({ "answer": answer })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["answered"], index + 1);
    }

    let (status, submission) = send(&app, "POST", "/api/quiz/submit", None).await;
    assert_eq!(status, StatusCode::OK, "{}", submission);
    assert_eq!(submission["result"]["correct"], 2);
    assert_eq!(submission["result"]["total"], 4);
    assert_eq!(submission["result"]["score"], 50.0);
    assert_eq!(submission["review"][3]["your_answer"], "berlin");
    assert_eq!(submission["review"][3]["correct_answer"], "Berlin");
    assert_eq!(submission["review"][3]["is_correct"], false);

    let (status, history) = send(&app, "GET", "/api/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["entries"].as_array().unwrap().len(), 1);
    assert_eq!(history["entries"][0]["score"], 50.0);
    assert_eq!(history["summary"]["attempts"], 1);
}

#[tokio::test]
async fn submit_with_inline_answers_and_repeat_history() {
    let app = setup_app(StubClient::replying(Ok(capitals_quiz())));
    generate_capitals(&app).await;

    let all_right = json!({ "answers": { "0": "Paris", "1": "Rome", "2": "Madrid", "3": "Berlin" } });
    let (status, first) = send(&app, "POST", "/api/quiz/submit", Some(all_right)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["result"]["score"], 100.0);

    let all_wrong = json!({ "answers": { "0": "paris", "1": "Milan", "2": "Seville", "3": "Bonn" } });
    let (status, second) = send(&app, "POST", "/api/quiz/submit", Some(all_wrong)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["result"]["score"], 0.0);
    assert_eq!(second["result"]["correct"], 0);

    let (_, history) = send(&app, "GET", "/api/history", None).await;
    let entries = history["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["attempt"], 1);
    assert_eq!(entries[1]["attempt"], 2);
    assert_eq!(history["summary"]["best_score"], 100.0);
    assert_eq!(history["summary"]["latest_score"], 0.0);
}

#[tokio::test]
async fn unparsable_submit_body_records_nothing() {
    let app = setup_app(StubClient::replying(Ok(capitals_quiz())));
    generate_capitals(&app).await;

    for (index, answer) in [(0, "Paris"), (1, "Rome"), (2, "Madrid"), (3, "Berlin")] {
        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/quiz/answers/{}", index),
            Some(json!({ "answer": answer })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let bad_keys = json!({ "answers": { "first": "Lyon" } });
    let (status, body) = send(&app, "POST", "/api/quiz/submit", Some(bad_keys)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (_, history) = send(&app, "GET", "/api/history", None).await;
    assert_eq!(history["entries"].as_array().unwrap().len(), 0);

    let (status, submission) = send(&app, "POST", "/api/quiz/submit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(submission["result"]["score"], 100.0);
}

#[tokio::test]
async fn incomplete_answers_are_a_warning() {
    let app = setup_app(StubClient::replying(Ok(capitals_quiz())));
    generate_capitals(&app).await;

    let partial = json!({ "answers": { "0": "Paris", "1": "Rome", "2": "Madrid" } });
    let (status, body) = send(&app, "POST", "/api/quiz/submit", Some(partial)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "incomplete_answers");
    assert_eq!(body["missing"], json!([3]));

    let (_, history) = send(&app, "GET", "/api/history", None).await;
    assert_eq!(history["entries"].as_array().unwrap().len(), 0);

    let (status, view) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["answered"], 3);
}

#[tokio::test]
async fn malformed_response_surfaces_raw_text() {
    let app = setup_app(StubClient::replying(Ok("not json".to_string())));

    let (status, body) = send(
        &app,
        "POST",
        "/api/quiz/generate",
        Some(json!({ "topic": "Anything", "num_questions": 2, "question_type": "true_false" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "malformed_response");
    assert_eq!(body["raw_response"], "not json");

    let (status, _) = send(&app, "GET", "/api/quiz", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_failure_is_reported_distinctly() {
    let app = setup_app(StubClient::replying(Err(GenerationError::Api(
        "429 Too Many Requests".to_string(),
    ))));

    let (status, body) = send(
        &app,
        "POST",
        "/api/quiz/generate",
        Some(json!({ "topic": "Anything", "question_type": "short_answer" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["kind"], "api_error");
    assert!(body["error"].as_str().unwrap().contains("429"));
}

#[tokio::test]
async fn invalid_requests_never_reach_the_model() {
    let client = StubClient::replying(Ok(capitals_quiz()));
    let app = setup_app(client.clone());

    let (status, _) = send(
        &app,
        "POST",
        "/api/quiz/generate",
        Some(json!({ "topic": "Maths", "num_questions": 11, "question_type": "multiple_choice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/quiz/generate",
        Some(json!({ "topic": "   ", "question_type": "multiple_choice" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn answering_without_quiz_conflicts() {
    let app = setup_app(StubClient::replying(Ok(capitals_quiz())));

    let (status, body) = send(&app, "POST", "/api/quiz/submit", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "no_active_quiz");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/quiz/answers/0",
        Some(json!({ "answer": "Paris" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

fn multipart_body(boundary: &str, filename: &str, file: &str, fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            boundary, name, value
        ));
    }
    body.push_str(&format!(
        "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n{}\r\n--{}--\r\n",
        boundary, filename, file, boundary
    ));
    body
}

async fn upload(app: &Router, body: String, boundary: &str) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/quiz/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn uploaded_text_document_feeds_the_prompt() {
    let client = StubClient::replying(Ok(capitals_quiz()));
    let app = setup_app(client.clone());
    let boundary = "quizboundary";

    let body = multipart_body(
        boundary,
        "notes.txt",
        "Paris, Rome, Madrid and Berlin are capitals.",
        &[("num_questions", "4"), ("question_type", "MCQ")],
    );
    let (status, json) = upload(&app, body, boundary).await;
    assert_eq!(status, StatusCode::CREATED, "{}", json);
    assert_eq!(json["quiz"]["total_questions"], 4);

    let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
    assert!(prompt.contains("Paris, Rome, Madrid and Berlin are capitals."));
    assert!(prompt.contains("'General'"));
}

#[tokio::test]
async fn unsupported_upload_is_rejected_before_generation() {
    let client = StubClient::replying(Ok(capitals_quiz()));
    let app = setup_app(client.clone());
    let boundary = "quizboundary";

    let body = multipart_body(boundary, "slides.pptx", "binary", &[("question_type", "MCQ")]);
    let (status, json) = upload(&app, body, boundary).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["kind"], "extraction_failed");
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}
