use crate::error::{Error, Result};
use crate::models::history::{HistoryLog, HistorySummary};
use crate::models::quiz::{QuestionCount, QuestionType};
use crate::models::score::{AnswerSet, ScoreResult};
use crate::services::quiz_generator_service::GenerationSource;
use crate::session::ActiveQuiz;
use crate::utils::time;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_num_questions() -> usize {
    QuestionCount::DEFAULT
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizPayload {
    #[validate(length(max = 200))]
    pub topic: Option<String>,
    pub content: Option<String>,
    #[serde(default = "default_num_questions")]
    #[validate(range(min = 1, max = 10))]
    pub num_questions: usize,
    pub question_type: QuestionType,
}

impl GenerateQuizPayload {
    /// Pasted content takes precedence over a bare topic.
    pub fn source(&self) -> Result<GenerationSource> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        match (non_blank(&self.content), non_blank(&self.topic)) {
            (Some(content), topic) => Ok(GenerationSource::document(content, topic.as_deref())),
            (None, Some(topic)) => Ok(GenerationSource::topic(&topic)),
            (None, None) => Err(Error::BadRequest(
                "Please enter a topic or provide content".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveAnswerPayload {
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitQuizPayload {
    #[serde(default)]
    pub answers: Option<AnswerSet>,
}

/// A question as shown before submission, without its answer key.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub question: String,
    pub choices: Vec<String>,
    pub hint: String,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub question_type: QuestionType,
    pub total_questions: usize,
    pub answered: usize,
    pub questions: Vec<QuestionView>,
}

impl From<&ActiveQuiz> for QuizView {
    fn from(active: &ActiveQuiz) -> Self {
        let question_type = active.quiz.question_type;
        let questions = active
            .quiz
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionView {
                index,
                question: q.text.clone(),
                choices: q.choices(question_type),
                hint: q.hint.clone(),
                answer: active.answers.get(index).map(str::to_string),
            })
            .collect();

        Self {
            question_type,
            total_questions: active.quiz.len(),
            answered: active.answers.len(),
            questions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateQuizResponse {
    pub quiz: QuizView,
    pub raw_response: String,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub attempt: usize,
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub recorded_at: String,
}

impl HistoryEntry {
    fn new(attempt: usize, result: &ScoreResult) -> Self {
        Self {
            attempt,
            score: result.score,
            correct: result.correct,
            total: result.total,
            timestamp: result.timestamp,
            recorded_at: time::to_display(result.timestamp),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<HistoryEntry>,
    pub summary: HistorySummary,
}

impl From<&HistoryLog> for HistoryResponse {
    fn from(log: &HistoryLog) -> Self {
        Self {
            entries: log
                .entries()
                .iter()
                .enumerate()
                .map(|(i, r)| HistoryEntry::new(i + 1, r))
                .collect(),
            summary: log.summary(),
        }
    }
}
