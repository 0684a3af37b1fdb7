use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    errors::AppResult,
    models::dto::{
        request::SubmitQuizRequest,
        response::{SessionStartResponse, SubmissionResponse},
    },
    services::{question_sampler::QuestionSampler, submission_scorer::ScoringService},
};

/// Where a session gets its questions and sends its answers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptBackend: Send + Sync {
    async fn start_session(&self, quiz_id: &str) -> AppResult<SessionStartResponse>;
    async fn submit(&self, request: SubmitQuizRequest) -> AppResult<SubmissionResponse>;
}

/// Runs sessions in-process against the services, on behalf of one user.
pub struct LocalAttemptBackend {
    sampler: Arc<QuestionSampler>,
    scorer: Arc<ScoringService>,
    user_id: String,
}

impl LocalAttemptBackend {
    pub fn new(
        sampler: Arc<QuestionSampler>,
        scorer: Arc<ScoringService>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            sampler,
            scorer,
            user_id: user_id.into(),
        }
    }
}

#[async_trait]
impl AttemptBackend for LocalAttemptBackend {
    async fn start_session(&self, quiz_id: &str) -> AppResult<SessionStartResponse> {
        let sampled = self.sampler.sample(quiz_id).await?;
        Ok(SessionStartResponse {
            quiz: sampled.quiz,
            questions: sampled.questions,
        })
    }

    async fn submit(&self, request: SubmitQuizRequest) -> AppResult<SubmissionResponse> {
        let outcome = self.scorer.submit(&self.user_id, request).await?;
        Ok(SubmissionResponse::from(&outcome.result))
    }
}
