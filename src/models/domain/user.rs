use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::POINTS_PER_LEVEL;

/// Progress view of a learner. Accounts themselves are managed by the
/// external identity service; this crate only reads them and moves points.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default = "first_level")]
    pub level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn first_level() -> i32 {
    1
}

/// Level reached with the given cumulative points.
pub fn level_for_points(total_points: i64) -> i32 {
    let level = total_points.max(0) / POINTS_PER_LEVEL + 1;
    i32::try_from(level).unwrap_or(i32::MAX)
}
