use serde::{Deserialize, Serialize};
use validator::Validate;

/// One learner selection as sent at finalization. `selected_option_id` is
/// `None` for a question left unanswered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct AnswerSelection {
    #[validate(length(min = 1, max = 100))]
    pub question_id: String,

    #[serde(default)]
    pub selected_option_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitQuizRequest {
    #[validate(length(min = 1, max = 100))]
    pub quiz_id: String,

    #[validate(length(min = 1, message = "No answers provided"), nested)]
    pub answers: Vec<AnswerSelection>,

    #[serde(alias = "time_taken")]
    #[validate(range(min = 0))]
    pub time_taken_seconds: i64,

    /// Idempotency key generated once per session by the client.
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub submission_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
