use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scored outcome of one finalized session. Stored as a single document
/// with its answers embedded so both are written in one insert.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizResult {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    /// Client idempotency key, when the submitter supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub time_taken_seconds: i64,
    pub percentage: f64,
    pub passed: bool,
    pub points_earned: i32,
    pub answers: Vec<SubmittedAnswer>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubmittedAnswer {
    pub result_id: String,
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub is_correct: bool,
}

/// Cumulative figures over every result a user has recorded. The average is
/// kept unrounded so achievement thresholds compare against the exact value.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UserStatistics {
    pub attempt_count: i64,
    pub average_score: f64,
    pub max_score: f64,
    pub total_points: i64,
    pub passed_count: i64,
}

impl UserStatistics {
    pub fn from_results(results: &[QuizResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let attempt_count = results.len() as i64;
        let sum: f64 = results.iter().map(|r| r.percentage).sum();
        let max_score = results
            .iter()
            .map(|r| r.percentage)
            .fold(0.0_f64, f64::max);

        UserStatistics {
            attempt_count,
            average_score: sum / attempt_count as f64,
            max_score,
            total_points: results.iter().map(|r| i64::from(r.points_earned)).sum(),
            passed_count: results.iter().filter(|r| r.passed).count() as i64,
        }
    }

    /// Copy with the average rounded to two decimals, for history views.
    pub fn for_display(&self) -> Self {
        UserStatistics {
            average_score: round_to_hundredths(self.average_score),
            ..self.clone()
        }
    }
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
