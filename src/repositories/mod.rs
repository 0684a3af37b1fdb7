pub mod achievement_repository;
pub mod quiz_repository;
pub mod result_repository;
pub mod user_repository;

pub use achievement_repository::{AchievementRepository, MongoAchievementRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use result_repository::{MongoResultRepository, ResultRepository};
pub use user_repository::{MongoUserRepository, UserRepository};

#[cfg(test)]
pub use achievement_repository::MockAchievementRepository;
#[cfg(test)]
pub use quiz_repository::MockQuizRepository;
#[cfg(test)]
pub use result_repository::MockResultRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
