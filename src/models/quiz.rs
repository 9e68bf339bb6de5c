use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[serde(alias = "MCQ", alias = "mcq")]
    MultipleChoice,
    #[serde(alias = "True/False", alias = "true/false")]
    TrueFalse,
    #[serde(alias = "Short Answer")]
    ShortAnswer,
}

impl QuestionType {
    /// Label used inside the generation prompt.
    pub fn prompt_label(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "MCQ",
            QuestionType::TrueFalse => "True/False",
            QuestionType::ShortAnswer => "Short Answer",
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(self, QuestionType::MultipleChoice)
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quoted = serde_json::Value::String(s.trim().to_string());
        serde_json::from_value(quoted).map_err(|_| format!("Unknown question type: {}", s))
    }
}

/// Number of questions in one generation request, `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionCount(usize);

impl QuestionCount {
    pub const MIN: usize = 1;
    pub const MAX: usize = 10;
    pub const DEFAULT: usize = 5;

    pub fn new(count: usize) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&count).then_some(Self(count))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for QuestionCount {
    type Error = crate::error::Error;

    fn try_from(count: usize) -> Result<Self, Self::Error> {
        Self::new(count).ok_or_else(|| {
            crate::error::Error::BadRequest(format!(
                "Number of questions must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub hint: String,
}

impl Question {
    /// Answers the user picks from, if the type is not free text.
    pub fn choices(&self, question_type: QuestionType) -> Vec<String> {
        match question_type {
            QuestionType::MultipleChoice => self.options.clone(),
            QuestionType::TrueFalse => vec!["True".to_string(), "False".to_string()],
            QuestionType::ShortAnswer => Vec::new(),
        }
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }

    pub fn answer_key_in_options(&self) -> bool {
        self.options.iter().any(|o| o == &self.correct_answer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question_type: QuestionType,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Indices of multiple-choice questions whose answer key is not one of
    /// their options.
    pub fn answer_key_mismatches(&self) -> Vec<usize> {
        if !self.question_type.has_options() {
            return Vec::new();
        }
        self.questions
            .iter()
            .enumerate()
            .filter(|(_, q)| !q.answer_key_in_options())
            .map(|(i, _)| i)
            .collect()
    }
}
