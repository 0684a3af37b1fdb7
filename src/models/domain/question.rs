use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub quiz_id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub points: i32,
    /// Display order within the quiz.
    pub order: i32,
    pub options: Vec<QuestionOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionOption {
    pub id: String,
    /// Display label such as "A" or "B".
    pub label: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Exactly one option is correct.
    SingleChoice,
}

/// Authoritative grading data for one question. Never leaves the server
/// before submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerKey {
    pub question_id: String,
    pub points: i32,
    pub correct_option_id: Option<String>,
}

impl From<&Question> for AnswerKey {
    fn from(question: &Question) -> Self {
        AnswerKey {
            question_id: question.id.clone(),
            points: question.points,
            correct_option_id: question
                .options
                .iter()
                .find(|option| option.is_correct)
                .map(|option| option.id.clone()),
        }
    }
}
