pub mod achievement;
pub mod question;
pub mod quiz;
pub mod result;
pub mod user;
pub use achievement::{AchievementGrant, AchievementRule, GrantOutcome, RequirementType};
pub use question::{AnswerKey, Question, QuestionOption, QuestionType};
pub use quiz::{Difficulty, QuizDefinition};
pub use result::{QuizResult, SubmittedAnswer, UserStatistics};
pub use user::UserProfile;
