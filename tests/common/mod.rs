#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;

use quiz_engine::{
    app_state::{AppState, Repositories},
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        user::level_for_points, AchievementGrant, AchievementRule, AnswerKey, Difficulty,
        GrantOutcome, Question, QuestionOption, QuestionType, QuizDefinition, QuizResult,
        RequirementType, UserProfile,
    },
    repositories::{AchievementRepository, QuizRepository, ResultRepository, UserRepository},
};

pub const QUIZ_ID: &str = "quiz-1";
pub const USER_ID: &str = "user-1";

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, QuizDefinition>>>,
    questions: Arc<RwLock<HashMap<String, Question>>>,
}

impl InMemoryQuizRepository {
    pub async fn insert_quiz(&self, quiz: QuizDefinition) {
        self.quizzes.write().await.insert(quiz.id.clone(), quiz);
    }

    pub async fn insert_question(&self, question: Question) {
        self.questions
            .write()
            .await
            .insert(question.id.clone(), question);
    }

    async fn questions_in(&self, quiz_id: &str, question_ids: &[String]) -> Vec<Question> {
        let questions = self.questions.read().await;
        question_ids
            .iter()
            .filter_map(|id| questions.get(id))
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_quiz(&self, quiz_id: &str) -> AppResult<Option<QuizDefinition>> {
        Ok(self.quizzes.read().await.get(quiz_id).cloned())
    }

    async fn list_question_ids(&self, quiz_id: &str) -> AppResult<Vec<String>> {
        let questions = self.questions.read().await;
        let mut ids: Vec<_> = questions
            .values()
            .filter(|q| q.quiz_id == quiz_id)
            .map(|q| q.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn find_questions(
        &self,
        quiz_id: &str,
        question_ids: &[String],
    ) -> AppResult<Vec<Question>> {
        Ok(self.questions_in(quiz_id, question_ids).await)
    }

    async fn find_answer_keys(
        &self,
        quiz_id: &str,
        question_ids: &[String],
    ) -> AppResult<Vec<AnswerKey>> {
        Ok(self
            .questions_in(quiz_id, question_ids)
            .await
            .iter()
            .map(AnswerKey::from)
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryResultRepository {
    results: Arc<RwLock<HashMap<String, QuizResult>>>,
}

impl InMemoryResultRepository {
    pub async fn count(&self) -> usize {
        self.results.read().await.len()
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult> {
        let mut results = self.results.write().await;
        if let Some(submission_id) = &result.submission_id {
            let duplicate = results.values().any(|r| {
                r.user_id == result.user_id && r.submission_id.as_ref() == Some(submission_id)
            });
            if duplicate {
                return Err(AppError::AlreadyExists(format!(
                    "Submission '{}' already recorded",
                    submission_id
                )));
            }
        }
        results.insert(result.id.clone(), result.clone());
        Ok(result)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizResult>> {
        Ok(self.results.read().await.get(id).cloned())
    }

    async fn find_by_submission_id(
        &self,
        user_id: &str,
        submission_id: &str,
    ) -> AppResult<Option<QuizResult>> {
        Ok(self
            .results
            .read()
            .await
            .values()
            .find(|r| r.user_id == user_id && r.submission_id.as_deref() == Some(submission_id))
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<QuizResult>> {
        let results = self.results.read().await;
        let mut items: Vec<_> = results
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_for_user_paginated(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizResult>, i64)> {
        let items = self.list_for_user(user_id).await?;

        let total = items.len() as i64;
        let start = offset.max(0) as usize;
        let end = (start + limit.max(0) as usize).min(items.len());

        let page = if start >= items.len() {
            vec![]
        } else {
            items[start..end].to_vec()
        };

        Ok((page, total))
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryUserRepository {
    pub async fn insert(&self, user: UserProfile) {
        self.users.write().await.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn increment_points(&self, user_id: &str, delta: i64) -> AppResult<UserProfile> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;
        user.total_points += delta;
        user.level = level_for_points(user.total_points);
        Ok(user.clone())
    }

    async fn top_by_points(&self, limit: i64) -> AppResult<Vec<UserProfile>> {
        let users = self.users.read().await;
        let mut items: Vec<_> = users.values().cloned().collect();
        items.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| a.id.cmp(&b.id))
        });
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }
}

#[derive(Default)]
pub struct InMemoryAchievementRepository {
    rules: Arc<RwLock<Vec<AchievementRule>>>,
    grants: Arc<RwLock<Vec<AchievementGrant>>>,
}

impl InMemoryAchievementRepository {
    pub async fn insert_rule(&self, rule: AchievementRule) {
        self.rules.write().await.push(rule);
    }
}

#[async_trait]
impl AchievementRepository for InMemoryAchievementRepository {
    async fn list_rules(&self) -> AppResult<Vec<AchievementRule>> {
        Ok(self.rules.read().await.clone())
    }

    async fn list_granted(&self, user_id: &str) -> AppResult<Vec<AchievementGrant>> {
        let grants = self.grants.read().await;
        let mut items: Vec<_> = grants
            .iter()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.granted_at.cmp(&a.granted_at));
        Ok(items)
    }

    async fn grant(&self, user_id: &str, achievement_id: &str) -> AppResult<GrantOutcome> {
        let mut grants = self.grants.write().await;
        if grants
            .iter()
            .any(|g| g.user_id == user_id && g.achievement_id == achievement_id)
        {
            return Ok(GrantOutcome::AlreadyGranted);
        }
        grants.push(AchievementGrant {
            user_id: user_id.to_string(),
            achievement_id: achievement_id.to_string(),
            granted_at: Utc::now(),
        });
        Ok(GrantOutcome::Granted)
    }
}

pub struct TestEnv {
    pub state: AppState,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub results: Arc<InMemoryResultRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub achievements: Arc<InMemoryAchievementRepository>,
}

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: SecretString::from("mongodb://localhost:27017".to_string()),
        mongo_db_name: "quiz-test".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        cors_allowed_origin: "http://localhost:3000".to_string(),
        question_sample_size: 10,
        integrity_violation_limit: 3,
    }
}

pub fn quiz(time_limit_minutes: i32) -> QuizDefinition {
    QuizDefinition {
        id: QUIZ_ID.to_string(),
        title: "Rust Fundamentals".to_string(),
        description: None,
        category: "programming".to_string(),
        difficulty: Difficulty::Easy,
        time_limit_minutes,
        passing_score: 60.0,
        points: 10,
        is_active: true,
        created_at: Some(Utc::now()),
    }
}

pub fn question_id(i: usize) -> String {
    format!("q-{:02}", i)
}

pub fn right_option(question_id: &str) -> String {
    format!("{}-right", question_id)
}

pub fn wrong_option(question_id: &str) -> String {
    format!("{}-wrong", question_id)
}

pub fn question(i: usize) -> Question {
    let id = question_id(i);
    Question {
        id: id.clone(),
        quiz_id: QUIZ_ID.to_string(),
        text: format!("Question {}", i),
        question_type: QuestionType::SingleChoice,
        points: 1,
        order: i as i32,
        options: vec![
            QuestionOption {
                id: wrong_option(&id),
                label: "B".to_string(),
                text: "wrong".to_string(),
                is_correct: false,
            },
            QuestionOption {
                id: right_option(&id),
                label: "A".to_string(),
                text: "right".to_string(),
                is_correct: true,
            },
        ],
        created_at: None,
    }
}

pub fn rule(id: &str, requirement_type: RequirementType, threshold: f64) -> AchievementRule {
    AchievementRule {
        id: id.to_string(),
        name: id.replace('-', " "),
        description: String::new(),
        requirement_type,
        threshold,
    }
}

/// One learner, a quiz with `bank_size` questions, and three achievement rules.
pub async fn setup(bank_size: usize, time_limit_minutes: i32) -> TestEnv {
    let quizzes = Arc::new(InMemoryQuizRepository::default());
    let results = Arc::new(InMemoryResultRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let achievements = Arc::new(InMemoryAchievementRepository::default());

    quizzes.insert_quiz(quiz(time_limit_minutes)).await;
    for i in 0..bank_size {
        quizzes.insert_question(question(i)).await;
    }

    users
        .insert(UserProfile {
            id: USER_ID.to_string(),
            name: "Learner".to_string(),
            avatar: None,
            total_points: 0,
            level: 1,
            created_at: Some(Utc::now()),
        })
        .await;

    achievements
        .insert_rule(rule("first-quiz", RequirementType::AttemptCount, 1.0))
        .await;
    achievements
        .insert_rule(rule("perfectionist", RequirementType::MaxScore, 100.0))
        .await;
    achievements
        .insert_rule(rule("point-collector", RequirementType::Points, 20.0))
        .await;

    let state = AppState::from_parts(
        test_config(),
        Repositories {
            quizzes: quizzes.clone(),
            results: results.clone(),
            users: users.clone(),
            achievements: achievements.clone(),
        },
    );

    TestEnv {
        state,
        quizzes,
        results,
        users,
        achievements,
    }
}
