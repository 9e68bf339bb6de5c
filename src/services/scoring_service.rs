use crate::error::ScoringError;
use crate::models::quiz::Quiz;
use crate::models::score::{AnswerSet, QuestionReview, ScoreResult};
use crate::utils::time;

pub struct ScoringService;

impl ScoringService {
    /// Exact-match scoring. Requires one answer per question.
    pub fn score(quiz: &Quiz, answers: &AnswerSet) -> Result<ScoreResult, ScoringError> {
        let total = quiz.len();
        if total == 0 {
            return Err(ScoringError::EmptyQuiz);
        }

        let missing = answers.missing(total);
        if !missing.is_empty() {
            return Err(ScoringError::IncompleteAnswers { missing });
        }

        let correct = quiz
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| answers.get(*i).is_some_and(|a| q.is_correct(a)))
            .count();

        Ok(ScoreResult {
            score: 100.0 * correct as f64 / total as f64,
            correct,
            total,
            timestamp: time::now(),
        })
    }

    pub fn review(quiz: &Quiz, answers: &AnswerSet) -> Vec<QuestionReview> {
        quiz.questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let your_answer = answers.get(index).unwrap_or_default().to_string();
                QuestionReview {
                    index,
                    question: q.text.clone(),
                    is_correct: q.is_correct(&your_answer),
                    your_answer,
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                }
            })
            .collect()
    }
}
