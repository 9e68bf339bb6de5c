pub mod history;
pub mod quiz;
pub mod score;

pub use history::{HistoryLog, HistorySummary};
pub use quiz::{Question, QuestionCount, QuestionType, Quiz};
pub use score::{AnswerSet, QuestionReview, ScoreResult};
