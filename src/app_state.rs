use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        AchievementRepository, MongoAchievementRepository, MongoQuizRepository,
        MongoResultRepository, MongoUserRepository, QuizRepository, ResultRepository,
        UserRepository,
    },
    services::{AchievementEvaluator, ProgressService, QuestionSampler, ScoringService},
};

/// Storage seams the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub quizzes: Arc<dyn QuizRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub users: Arc<dyn UserRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
}

#[derive(Clone)]
pub struct AppState {
    pub sampler: Arc<QuestionSampler>,
    pub scorer: Arc<ScoringService>,
    pub progress: Arc<ProgressService>,
    pub config: Arc<Config>,
    /// `None` when running on non-Mongo repositories.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quizzes = Arc::new(MongoQuizRepository::new(&db));
        quizzes.ensure_indexes().await?;
        let results = Arc::new(MongoResultRepository::new(&db));
        results.ensure_indexes().await?;
        let users = Arc::new(MongoUserRepository::new(&db));
        users.ensure_indexes().await?;
        let achievements = Arc::new(MongoAchievementRepository::new(&db));
        achievements.ensure_indexes().await?;

        let repositories = Repositories {
            quizzes,
            results,
            users,
            achievements,
        };

        let mut state = Self::from_parts(config, repositories);
        state.db = Some(db);
        Ok(state)
    }

    pub fn from_parts(config: Config, repositories: Repositories) -> Self {
        let Repositories {
            quizzes,
            results,
            users,
            achievements,
        } = repositories;

        let evaluator = Arc::new(AchievementEvaluator::new(
            Arc::clone(&results),
            Arc::clone(&achievements),
        ));
        let sampler = Arc::new(QuestionSampler::new(
            Arc::clone(&quizzes),
            config.question_sample_size,
        ));
        let scorer = Arc::new(ScoringService::new(
            quizzes,
            Arc::clone(&results),
            Arc::clone(&users),
            evaluator,
        ));
        let progress = Arc::new(ProgressService::new(results, users, achievements));

        Self {
            sampler,
            scorer,
            progress,
            config: Arc::new(config),
            db: None,
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        match &self.db {
            Some(db) => db.health_check().await,
            None => Ok(()),
        }
    }
}
