use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{result::round_to_hundredths, AnswerKey, QuizDefinition, QuizResult, SubmittedAnswer},
        dto::request::{AnswerSelection, SubmitQuizRequest},
    },
    repositories::{QuizRepository, ResultRepository, UserRepository},
    services::achievement_evaluator::AchievementEvaluator,
};

/// Outcome of grading one answer list, before any identifiers are assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    pub percentage: f64,
    pub passed: bool,
    pub points_earned: i32,
    pub graded: Vec<GradedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: String,
    pub selected_option_id: Option<String>,
    pub is_correct: bool,
}

/// Grades `answers` against the authoritative keys.
///
/// Every answer counts toward `total_questions`. A question whose key has no
/// correct option counts as neither correct nor wrong. An unanswered question
/// is always wrong when a correct option exists.
pub fn score_submission(
    quiz: &QuizDefinition,
    keys: &HashMap<String, AnswerKey>,
    answers: &[AnswerSelection],
) -> AppResult<ScoreCard> {
    let mut seen = HashSet::with_capacity(answers.len());
    let mut score = 0;
    let mut correct_answers = 0;
    let mut wrong_answers = 0;
    let mut graded = Vec::with_capacity(answers.len());

    for answer in answers {
        if !seen.insert(answer.question_id.as_str()) {
            return Err(AppError::InvalidRequest(format!(
                "Question '{}' answered more than once",
                answer.question_id
            )));
        }

        let key = keys.get(&answer.question_id).ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "Question '{}' does not belong to quiz '{}'",
                answer.question_id, quiz.id
            ))
        })?;

        let is_correct = match (&key.correct_option_id, &answer.selected_option_id) {
            (Some(correct), Some(selected)) => correct == selected,
            _ => false,
        };

        if is_correct {
            correct_answers += 1;
            score += key.points;
        } else if key.correct_option_id.is_some() {
            wrong_answers += 1;
        }

        graded.push(GradedAnswer {
            question_id: answer.question_id.clone(),
            selected_option_id: answer.selected_option_id.clone(),
            is_correct,
        });
    }

    let total_questions = answers.len() as i32;
    let percentage = if total_questions > 0 {
        round_to_hundredths(f64::from(correct_answers) * 100.0 / f64::from(total_questions))
    } else {
        0.0
    };
    let passed = percentage >= quiz.passing_score;

    Ok(ScoreCard {
        score,
        total_questions,
        correct_answers,
        wrong_answers,
        percentage,
        passed,
        points_earned: if passed { quiz.points } else { 0 },
        graded,
    })
}

pub struct SubmissionOutcome {
    pub result: QuizResult,
    /// True when an earlier submission with the same idempotency key was returned.
    pub replayed: bool,
    /// Background achievement evaluation, when one was dispatched. Dropping
    /// the handle detaches the task.
    pub achievement_task: Option<JoinHandle<()>>,
}

pub struct ScoringService {
    quizzes: Arc<dyn QuizRepository>,
    results: Arc<dyn ResultRepository>,
    users: Arc<dyn UserRepository>,
    achievements: Arc<AchievementEvaluator>,
}

impl ScoringService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        results: Arc<dyn ResultRepository>,
        users: Arc<dyn UserRepository>,
        achievements: Arc<AchievementEvaluator>,
    ) -> Self {
        Self {
            quizzes,
            results,
            users,
            achievements,
        }
    }

    pub async fn submit(
        &self,
        user_id: &str,
        request: SubmitQuizRequest,
    ) -> AppResult<SubmissionOutcome> {
        request.validate()?;

        if let Some(submission_id) = &request.submission_id {
            if let Some(existing) = self
                .results
                .find_by_submission_id(user_id, submission_id)
                .await?
            {
                log::info!(
                    "Submission '{}' already recorded as result '{}'",
                    submission_id,
                    existing.id
                );
                return replay(existing, &request);
            }
        }

        let quiz = self
            .quizzes
            .find_quiz(&request.quiz_id)
            .await?
            .ok_or_else(|| {
                AppError::InvalidRequest(format!("Quiz with id '{}' not found", request.quiz_id))
            })?;

        let question_ids: Vec<String> = request
            .answers
            .iter()
            .map(|a| a.question_id.clone())
            .collect();
        let keys: HashMap<String, AnswerKey> = self
            .quizzes
            .find_answer_keys(&quiz.id, &question_ids)
            .await?
            .into_iter()
            .map(|key| (key.question_id.clone(), key))
            .collect();

        let card = score_submission(&quiz, &keys, &request.answers)?;
        let result = build_result(user_id, &quiz, &request, card);

        let result = match self.results.create(result).await {
            Ok(result) => result,
            Err(AppError::AlreadyExists(msg)) => {
                return self.resolve_duplicate(user_id, &request, msg).await;
            }
            Err(err) => return Err(err),
        };

        log::info!(
            "Recorded result '{}' for user '{}' on quiz '{}': {:.2}% passed={}",
            result.id,
            user_id,
            quiz.id,
            result.percentage,
            result.passed
        );

        let mut achievement_task = None;
        if result.passed {
            if let Err(err) = self
                .users
                .increment_points(user_id, i64::from(result.points_earned))
                .await
            {
                log::error!(
                    "Failed to award {} points to user '{}' for result '{}': {}",
                    result.points_earned,
                    user_id,
                    result.id,
                    err
                );
            }

            achievement_task = Some(self.achievements.dispatch(user_id));
        }

        Ok(SubmissionOutcome {
            result,
            replayed: false,
            achievement_task,
        })
    }

    /// A concurrent submission with the same key won the insert race.
    async fn resolve_duplicate(
        &self,
        user_id: &str,
        request: &SubmitQuizRequest,
        msg: String,
    ) -> AppResult<SubmissionOutcome> {
        let Some(submission_id) = &request.submission_id else {
            return Err(AppError::AlreadyExists(msg));
        };

        self.results
            .find_by_submission_id(user_id, submission_id)
            .await?
            .ok_or(AppError::AlreadyExists(msg))
            .and_then(|existing| replay(existing, request))
    }
}

/// The key only identifies a submission together with its quiz.
fn replay(result: QuizResult, request: &SubmitQuizRequest) -> AppResult<SubmissionOutcome> {
    if result.quiz_id != request.quiz_id {
        return Err(AppError::InvalidRequest(format!(
            "Submission id '{}' was already used for another quiz",
            result.submission_id.as_deref().unwrap_or_default()
        )));
    }

    Ok(SubmissionOutcome {
        result,
        replayed: true,
        achievement_task: None,
    })
}

fn build_result(
    user_id: &str,
    quiz: &QuizDefinition,
    request: &SubmitQuizRequest,
    card: ScoreCard,
) -> QuizResult {
    let id = Uuid::new_v4().to_string();
    let answers = card
        .graded
        .into_iter()
        .map(|g| SubmittedAnswer {
            result_id: id.clone(),
            question_id: g.question_id,
            selected_option_id: g.selected_option_id,
            is_correct: g.is_correct,
        })
        .collect();

    QuizResult {
        id,
        user_id: user_id.to_string(),
        quiz_id: quiz.id.clone(),
        submission_id: request.submission_id.clone(),
        score: card.score,
        total_questions: card.total_questions,
        correct_answers: card.correct_answers,
        wrong_answers: card.wrong_answers,
        time_taken_seconds: request.time_taken_seconds,
        percentage: card.percentage,
        passed: card.passed,
        points_earned: card.points_earned,
        answers,
        created_at: Utc::now(),
    }
}
