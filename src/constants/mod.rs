use std::time::Duration;

/// Upper bound on the number of questions drawn for one session.
pub const QUESTION_SAMPLE_SIZE: usize = 10;

/// Visibility losses tolerated before the session is force-submitted.
pub const VIOLATION_LIMIT: u32 = 3;

pub const POINTS_PER_LEVEL: i64 = 100;

pub const LEADERBOARD_SIZE: i64 = 10;

pub const CLOCK_TICK: Duration = Duration::from_secs(1);

pub const USER_ID_HEADER: &str = "X-User-Id";

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
