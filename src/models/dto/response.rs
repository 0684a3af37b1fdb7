use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{
    AchievementGrant, AchievementRule, Question, QuestionOption, QuestionType, QuizDefinition,
    QuizResult, SubmittedAnswer, UserProfile, UserStatistics,
};

/// Option as shown to the learner. Carries no correctness flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicOption {
    pub id: String,
    pub label: String,
    pub text: String,
}

impl From<QuestionOption> for PublicOption {
    fn from(option: QuestionOption) -> Self {
        PublicOption {
            id: option.id,
            label: option.label,
            text: option.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub quiz_id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub points: i32,
    pub order: i32,
    pub options: Vec<PublicOption>,
}

impl From<Question> for PublicQuestion {
    fn from(question: Question) -> Self {
        let mut options = question.options;
        options.sort_by(|a, b| a.label.cmp(&b.label));

        PublicQuestion {
            id: question.id,
            quiz_id: question.quiz_id,
            text: question.text,
            question_type: question.question_type,
            points: question.points,
            order: question.order,
            options: options.into_iter().map(PublicOption::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStartResponse {
    pub quiz: QuizDefinition,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub result_id: String,
    pub score: i32,
    pub total_questions: i32,
    pub correct_answers: i32,
    pub wrong_answers: i32,
    /// Two-decimal rendering, e.g. "70.00".
    pub percentage: String,
    pub passed: bool,
    pub points_earned: i32,
    pub time_taken_seconds: i64,
}

impl From<&QuizResult> for SubmissionResponse {
    fn from(result: &QuizResult) -> Self {
        SubmissionResponse {
            result_id: result.id.clone(),
            score: result.score,
            total_questions: result.total_questions,
            correct_answers: result.correct_answers,
            wrong_answers: result.wrong_answers,
            percentage: format!("{:.2}", result.percentage),
            passed: result.passed,
            points_earned: result.points_earned,
            time_taken_seconds: result.time_taken_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultDetailResponse {
    #[serde(flatten)]
    pub summary: SubmissionResponse,
    pub quiz_id: String,
    pub answers: Vec<SubmittedAnswer>,
    pub created_at: DateTime<Utc>,
}

impl From<QuizResult> for ResultDetailResponse {
    fn from(result: QuizResult) -> Self {
        ResultDetailResponse {
            summary: SubmissionResponse::from(&result),
            quiz_id: result.quiz_id,
            answers: result.answers,
            created_at: result.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<SubmissionResponse>,
    pub total: i64,
    pub statistics: UserStatistics,
}

#[derive(Debug, Clone, Serialize)]
pub struct EarnedAchievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub granted_at: DateTime<Utc>,
}

impl EarnedAchievement {
    pub fn new(rule: &AchievementRule, grant: &AchievementGrant) -> Self {
        EarnedAchievement {
            id: rule.id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            granted_at: grant.granted_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
    pub achievements: Vec<EarnedAchievement>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub total_points: i64,
    pub level: i32,
}
