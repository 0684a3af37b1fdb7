use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::result::UserStatistics;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct AchievementRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub requirement_type: RequirementType,
    pub threshold: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    AttemptCount,
    AverageScore,
    MaxScore,
    Points,
}

impl AchievementRule {
    /// Whether the current statistics meet this rule's threshold.
    pub fn is_met_by(&self, stats: &UserStatistics) -> bool {
        let value = match self.requirement_type {
            RequirementType::AttemptCount => stats.attempt_count as f64,
            RequirementType::AverageScore => stats.average_score,
            RequirementType::MaxScore => stats.max_score,
            RequirementType::Points => stats.total_points as f64,
        };
        value >= self.threshold
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AchievementGrant {
    pub user_id: String,
    pub achievement_id: String,
    pub granted_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted,
    AlreadyGranted,
}
