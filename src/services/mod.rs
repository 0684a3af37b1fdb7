pub mod achievement_evaluator;
pub mod progress_service;
pub mod question_sampler;
pub mod submission_scorer;

pub use achievement_evaluator::AchievementEvaluator;
pub use progress_service::ProgressService;
pub use question_sampler::{QuestionSampler, SampledQuiz};
pub use submission_scorer::{score_submission, ScoringService, SubmissionOutcome};
