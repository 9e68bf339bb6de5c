use crate::error::{Error, Result};
use crate::models::history::HistoryLog;
use crate::models::quiz::Quiz;
use crate::models::score::{AnswerSet, QuestionReview, ScoreResult};
use crate::services::scoring_service::ScoringService;
use serde::Serialize;

/// Quiz in progress together with the answers given so far.
#[derive(Debug, Clone)]
pub struct ActiveQuiz {
    pub quiz: Quiz,
    pub answers: AnswerSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub result: ScoreResult,
    pub review: Vec<QuestionReview>,
}

/// All state of one interactive session. Dropped when the session ends.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: Option<ActiveQuiz>,
    history: HistoryLog,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current quiz and discards earlier answers.
    pub fn start_quiz(&mut self, quiz: Quiz) {
        self.current = Some(ActiveQuiz {
            quiz,
            answers: AnswerSet::new(),
        });
    }

    pub fn current(&self) -> Option<&ActiveQuiz> {
        self.current.as_ref()
    }

    pub fn record_answer(&mut self, index: usize, answer: String) -> Result<()> {
        let active = self.current.as_mut().ok_or(Error::NoActiveQuiz)?;
        let total = active.quiz.len();
        if index >= total {
            return Err(Error::BadRequest(format!(
                "Question index {} is out of range, quiz has {} questions",
                index, total
            )));
        }
        active.answers.insert(index, answer);
        Ok(())
    }

    /// Records every answer or none of them.
    pub fn record_answers(&mut self, answers: AnswerSet) -> Result<()> {
        let active = self.current.as_ref().ok_or(Error::NoActiveQuiz)?;
        if let Some((index, _)) = answers.iter().find(|(i, _)| *i >= active.quiz.len()) {
            return Err(Error::BadRequest(format!(
                "Question index {} is out of range, quiz has {} questions",
                index,
                active.quiz.len()
            )));
        }
        for (index, answer) in answers.iter() {
            self.record_answer(index, answer.to_string())?;
        }
        Ok(())
    }

    /// Scores the current quiz and appends the result to the history.
    pub fn submit(&mut self) -> Result<Submission> {
        let active = self.current.as_ref().ok_or(Error::NoActiveQuiz)?;

        let result = ScoringService::score(&active.quiz, &active.answers).map_err(|e| {
            tracing::warn!(error = %e, "Submission rejected");
            e
        })?;
        let review = ScoringService::review(&active.quiz, &active.answers);
        let result = self.history.record(result).clone();

        tracing::info!(
            score = result.score,
            correct = result.correct,
            total = result.total,
            "Quiz scored"
        );
        Ok(Submission { result, review })
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}
