use std::{collections::HashSet, sync::Arc};

use tokio::task::JoinHandle;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{GrantOutcome, UserStatistics},
    repositories::{AchievementRepository, ResultRepository},
};

/// Grants achievements whose thresholds a user's statistics now meet.
pub struct AchievementEvaluator {
    results: Arc<dyn ResultRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl AchievementEvaluator {
    pub fn new(
        results: Arc<dyn ResultRepository>,
        achievements: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            results,
            achievements,
        }
    }

    /// Returns the ids granted by this call. Rules already held are skipped,
    /// and a grant that loses a race to a concurrent evaluation is not
    /// reported twice.
    pub async fn evaluate(&self, user_id: &str) -> AppResult<Vec<String>> {
        let history = self
            .results
            .list_for_user(user_id)
            .await
            .map_err(evaluation_failure)?;
        let stats = UserStatistics::from_results(&history);

        let rules = self
            .achievements
            .list_rules()
            .await
            .map_err(evaluation_failure)?;
        let held: HashSet<String> = self
            .achievements
            .list_granted(user_id)
            .await
            .map_err(evaluation_failure)?
            .into_iter()
            .map(|grant| grant.achievement_id)
            .collect();

        let mut granted = Vec::new();
        let mut failures = Vec::new();

        for rule in rules
            .iter()
            .filter(|rule| !held.contains(&rule.id) && rule.is_met_by(&stats))
        {
            match self.achievements.grant(user_id, &rule.id).await {
                Ok(GrantOutcome::Granted) => {
                    log::info!("Granted achievement '{}' to user '{}'", rule.id, user_id);
                    granted.push(rule.id.clone());
                }
                Ok(GrantOutcome::AlreadyGranted) => {}
                Err(err) => {
                    log::warn!(
                        "Failed to grant achievement '{}' to user '{}': {}",
                        rule.id,
                        user_id,
                        err
                    );
                    failures.push(rule.id.clone());
                }
            }
        }

        if !failures.is_empty() {
            return Err(AppError::EvaluationFailure(format!(
                "Could not grant achievements: {}",
                failures.join(", ")
            )));
        }

        Ok(granted)
    }

    /// Runs [`evaluate`](Self::evaluate) on a background task. Failures are
    /// logged and never reach the submitter.
    pub fn dispatch(self: &Arc<Self>, user_id: &str) -> JoinHandle<()> {
        let evaluator = Arc::clone(self);
        let user_id = user_id.to_string();

        tokio::spawn(async move {
            match evaluator.evaluate(&user_id).await {
                Ok(granted) if granted.is_empty() => {
                    log::debug!("No new achievements for user '{}'", user_id);
                }
                Ok(granted) => {
                    log::info!(
                        "User '{}' earned {} achievement(s)",
                        user_id,
                        granted.len()
                    );
                }
                Err(err) => {
                    log::error!("Achievement evaluation failed for user '{}': {}", user_id, err);
                }
            }
        })
    }
}

fn evaluation_failure(err: AppError) -> AppError {
    match err {
        AppError::EvaluationFailure(_) => err,
        other => AppError::EvaluationFailure(other.to_string()),
    }
}
