use crate::error::GenerationError;
use crate::models::quiz::{Question, QuestionCount, QuestionType, Quiz};
use crate::services::completion_client::{ChatMessage, CompletionClient, CompletionRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

const SYSTEM_PROMPT: &str = "You are an expert quiz author who writes clear educational questions. \
Respond with a single valid JSON object and nothing else.";

const DOCUMENT_TOPIC: &str = "General";

/// Content and topic handed to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSource {
    pub content: String,
    pub topic: String,
}

impl GenerationSource {
    /// A bare topic name is used verbatim as the subject matter.
    pub fn topic(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            content: name.clone(),
            topic: name,
        }
    }

    pub fn document(text: String, topic: Option<&str>) -> Self {
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DOCUMENT_TOPIC)
            .to_string();
        Self {
            content: text,
            topic,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    pub quiz: Quiz,
    pub raw_response: String,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct QuizGeneratorService {
    client: Arc<dyn CompletionClient>,
    model: String,
    temperature: f32,
}

impl QuizGeneratorService {
    pub fn new(client: Arc<dyn CompletionClient>, model: String, temperature: f32) -> Self {
        Self {
            client,
            model,
            temperature,
        }
    }

    /// Makes exactly one completion call and parses the reply into a quiz.
    pub async fn generate(
        &self,
        content: &str,
        topic: &str,
        count: QuestionCount,
        question_type: QuestionType,
    ) -> Result<GenerationOutput, GenerationError> {
        tracing::info!(
            topic,
            count = count.get(),
            question_type = question_type.prompt_label(),
            content_chars = content.chars().count(),
            "Generating quiz"
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(content, topic, count, question_type)),
            ],
            temperature: self.temperature,
        };

        let raw = self.client.complete(&request).await?;
        let quiz = parse_quiz_response(&raw, count, question_type).map_err(|e| {
            tracing::warn!(error = %e, "Model response could not be parsed");
            e
        })?;

        let warnings: Vec<String> = quiz
            .answer_key_mismatches()
            .into_iter()
            .map(|i| {
                tracing::warn!(question = i + 1, "Correct answer is not one of the options");
                format!(
                    "Question {}: correct answer is not one of the listed options",
                    i + 1
                )
            })
            .collect();

        tracing::info!(questions = quiz.len(), "Quiz generated");
        Ok(GenerationOutput {
            quiz,
            raw_response: raw,
            warnings,
        })
    }

    pub async fn generate_from(
        &self,
        source: &GenerationSource,
        count: QuestionCount,
        question_type: QuestionType,
    ) -> Result<GenerationOutput, GenerationError> {
        self.generate(&source.content, &source.topic, count, question_type)
            .await
    }
}

pub fn build_prompt(
    content: &str,
    topic: &str,
    count: QuestionCount,
    question_type: QuestionType,
) -> String {
    let options_line = if question_type.has_options() {
        "    \"options\": [\"option 1\", \"option 2\", \"option 3\", \"option 4\"],\n"
    } else {
        ""
    };
    let answer_rule = match question_type {
        QuestionType::MultipleChoice => {
            "\"correct_answer\" must be copied exactly from one of the \"options\"."
        }
        QuestionType::TrueFalse => "\"correct_answer\" must be exactly \"True\" or \"False\".",
        QuestionType::ShortAnswer => "\"correct_answer\" must be a short, exact answer.",
    };

    format!(
        "Write {count} {label} questions about the topic '{topic}' using the content below.\n\
For every question include the question text, {options_note}the correct answer, \
an explanation and a hint.\n\
{answer_rule}\n\n\
Return JSON shaped like this:\n\
{{\n  \"questions\": [\n    {{\n    \"question\": \"question text\",\n{options_line}    \
\"correct_answer\": \"correct answer\",\n    \"explanation\": \"why the answer is correct\",\n    \
\"hint\": \"a helpful hint\"\n    }}\n  ]\n}}\n\n\
Content: {content}",
        count = count.get(),
        label = question_type.prompt_label(),
        topic = topic,
        options_note = if question_type.has_options() {
            "four answer options, "
        } else {
            ""
        },
        answer_rule = answer_rule,
        options_line = options_line,
        content = content,
    )
}

#[derive(Deserialize)]
struct RawQuiz {
    questions: Vec<RawQuestion>,
}

#[derive(Deserialize)]
struct RawQuestion {
    question: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    correct_answer: JsonValue,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// Strict single-attempt parse of the model text into a quiz.
pub fn parse_quiz_response(
    raw: &str,
    count: QuestionCount,
    question_type: QuestionType,
) -> Result<Quiz, GenerationError> {
    let malformed = |reason: String| GenerationError::MalformedResponse {
        reason,
        raw: raw.to_string(),
    };

    let parsed: RawQuiz = serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;

    if parsed.questions.is_empty() {
        return Err(malformed("response contained no questions".to_string()));
    }
    if parsed.questions.len() < count.get() {
        return Err(malformed(format!(
            "expected {} questions, got {}",
            count.get(),
            parsed.questions.len()
        )));
    }

    let mut questions = Vec::with_capacity(count.get());
    for (idx, q) in parsed.questions.into_iter().take(count.get()).enumerate() {
        let correct_answer = answer_text(&q.correct_answer).ok_or_else(|| {
            malformed(format!(
                "question {} has an unusable correct_answer",
                idx + 1
            ))
        })?;
        let options = if question_type.has_options() {
            q.options.unwrap_or_default()
        } else {
            Vec::new()
        };

        questions.push(Question {
            text: q.question,
            options,
            correct_answer,
            explanation: q.explanation.unwrap_or_default(),
            hint: q.hint.unwrap_or_default(),
        });
    }

    Ok(Quiz {
        question_type,
        questions,
    })
}

fn answer_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Bool(true) => Some("True".to_string()),
        JsonValue::Bool(false) => Some("False".to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
