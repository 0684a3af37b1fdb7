use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quiz as authored by an administrator. Read-only for the attempt flow.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub difficulty: Difficulty,
    pub time_limit_minutes: i32,
    /// Minimum percentage (0-100) needed to pass.
    pub passing_score: f64,
    /// Reward granted on a passing attempt.
    pub points: i32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl QuizDefinition {
    /// Time budget of one session in whole seconds.
    pub fn time_budget_seconds(&self) -> u64 {
        u64::try_from(self.time_limit_minutes).unwrap_or(0) * 60
    }
}
