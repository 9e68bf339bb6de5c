use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Submitted answers keyed by 0-based question index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<usize, String>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, answer: impl Into<String>) {
        self.0.insert(index, answer.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.0.iter().map(|(i, a)| (*i, a.as_str()))
    }

    /// Indices in `0..total` with no submitted answer.
    pub fn missing(&self, total: usize) -> Vec<usize> {
        (0..total).filter(|i| !self.0.contains_key(i)).collect()
    }
}

impl FromIterator<(usize, String)> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReview {
    pub index: usize,
    pub question: String,
    pub your_answer: String,
    pub correct_answer: String,
    pub explanation: String,
    pub is_correct: bool,
}
