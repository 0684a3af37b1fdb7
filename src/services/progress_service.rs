use std::{collections::HashMap, sync::Arc};

use crate::{
    constants::LEADERBOARD_SIZE,
    errors::{AppError, AppResult},
    models::{
        domain::{AchievementRule, UserStatistics},
        dto::{
            request::PaginationParams,
            response::{
                EarnedAchievement, HistoryResponse, LeaderboardEntry, ProfileResponse,
                ResultDetailResponse, SubmissionResponse,
            },
        },
    },
    repositories::{AchievementRepository, ResultRepository, UserRepository},
};

/// Read side of a learner's progress: history, profile and rankings.
pub struct ProgressService {
    results: Arc<dyn ResultRepository>,
    users: Arc<dyn UserRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl ProgressService {
    pub fn new(
        results: Arc<dyn ResultRepository>,
        users: Arc<dyn UserRepository>,
        achievements: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            results,
            users,
            achievements,
        }
    }

    /// Results are only visible to the user who recorded them. Anyone else
    /// gets the same `NotFound` as for a missing id.
    pub async fn result_for_user(
        &self,
        user_id: &str,
        result_id: &str,
    ) -> AppResult<ResultDetailResponse> {
        self.results
            .find_by_id(result_id)
            .await?
            .filter(|result| result.user_id == user_id)
            .map(ResultDetailResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("Result with id '{}' not found", result_id)))
    }

    pub async fn history(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> AppResult<HistoryResponse> {
        let (page, total) = self
            .results
            .list_for_user_paginated(user_id, params.offset(), params.limit())
            .await?;
        let all = self.results.list_for_user(user_id).await?;

        Ok(HistoryResponse {
            history: page.iter().map(SubmissionResponse::from).collect(),
            total,
            statistics: UserStatistics::from_results(&all).for_display(),
        })
    }

    pub async fn profile(&self, user_id: &str) -> AppResult<ProfileResponse> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))?;

        let rules: HashMap<String, AchievementRule> = self
            .achievements
            .list_rules()
            .await?
            .into_iter()
            .map(|rule| (rule.id.clone(), rule))
            .collect();

        let achievements = self
            .achievements
            .list_granted(user_id)
            .await?
            .iter()
            .filter_map(|grant| {
                let rule = rules.get(&grant.achievement_id);
                if rule.is_none() {
                    log::warn!(
                        "User '{}' holds unknown achievement '{}'",
                        user_id,
                        grant.achievement_id
                    );
                }
                rule.map(|rule| EarnedAchievement::new(rule, grant))
            })
            .collect();

        Ok(ProfileResponse { user, achievements })
    }

    pub async fn leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let users = self.users.top_by_points(LEADERBOARD_SIZE).await?;

        Ok(users
            .into_iter()
            .enumerate()
            .map(|(i, user)| LeaderboardEntry {
                rank: i + 1,
                user_id: user.id,
                name: user.name,
                avatar: user.avatar,
                total_points: user.total_points,
                level: user.level,
            })
            .collect())
    }
}
