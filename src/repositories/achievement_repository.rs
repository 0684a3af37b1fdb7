use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{is_duplicate_key, Database},
    errors::AppResult,
    models::domain::{AchievementGrant, AchievementRule, GrantOutcome},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    async fn list_rules(&self) -> AppResult<Vec<AchievementRule>>;
    /// Grants held by the user, newest first.
    async fn list_granted(&self, user_id: &str) -> AppResult<Vec<AchievementGrant>>;
    /// Insert-if-absent keyed on `(user_id, achievement_id)`.
    async fn grant(&self, user_id: &str, achievement_id: &str) -> AppResult<GrantOutcome>;
}

pub struct MongoAchievementRepository {
    rules: Collection<AchievementRule>,
    grants: Collection<AchievementGrant>,
}

impl MongoAchievementRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            rules: db.get_collection("achievements"),
            grants: db.get_collection("user_achievements"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for achievement collections");

        let rule_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let grant_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "achievement_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("user_achievement_unique".to_string())
                    .build(),
            )
            .build();

        self.rules.create_index(rule_id_index).await?;
        self.grants.create_index(grant_index).await?;

        log::info!("Successfully created indexes for achievement collections");
        Ok(())
    }
}

#[async_trait]
impl AchievementRepository for MongoAchievementRepository {
    async fn list_rules(&self) -> AppResult<Vec<AchievementRule>> {
        let rules = self.rules.find(doc! {}).await?.try_collect().await?;
        Ok(rules)
    }

    async fn list_granted(&self, user_id: &str) -> AppResult<Vec<AchievementGrant>> {
        let grants = self
            .grants
            .find(doc! { "user_id": user_id })
            .sort(doc! { "granted_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(grants)
    }

    async fn grant(&self, user_id: &str, achievement_id: &str) -> AppResult<GrantOutcome> {
        let granted_at = bson::to_bson(&Utc::now())?;
        let update = doc! { "$setOnInsert": { "granted_at": granted_at } };

        let result = self
            .grants
            .update_one(
                doc! { "user_id": user_id, "achievement_id": achievement_id },
                update,
            )
            .upsert(true)
            .await;

        match result {
            Ok(outcome) if outcome.upserted_id.is_some() => Ok(GrantOutcome::Granted),
            Ok(_) => Ok(GrantOutcome::AlreadyGranted),
            // Two concurrent upserts on the same key: the loser sees the unique index.
            Err(err) if is_duplicate_key(&err) => Ok(GrantOutcome::AlreadyGranted),
            Err(err) => Err(err.into()),
        }
    }
}
