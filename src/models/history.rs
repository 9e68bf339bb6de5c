use crate::models::score::ScoreResult;
use serde::Serialize;

/// Scores of the current session in submission order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<ScoreResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub attempts: usize,
    pub average_score: Option<f64>,
    pub best_score: Option<f64>,
    pub latest_score: Option<f64>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result. Timestamps never go backwards: a result stamped
    /// earlier than the last entry takes the last entry's timestamp.
    pub fn record(&mut self, mut result: ScoreResult) -> &ScoreResult {
        if let Some(last) = self.entries.last() {
            if result.timestamp < last.timestamp {
                result.timestamp = last.timestamp;
            }
        }
        self.entries.push(result);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ScoreResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> HistorySummary {
        let scores: Vec<f64> = self.entries.iter().map(|e| e.score).collect();
        let average_score =
            (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

        HistorySummary {
            attempts: scores.len(),
            average_score,
            best_score: scores.iter().copied().reduce(f64::max),
            latest_score: scores.last().copied(),
        }
    }
}
