use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    constants::POINTS_PER_LEVEL,
    db::Database,
    errors::{AppError, AppResult},
    models::domain::UserProfile,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<UserProfile>>;
    /// Adds `delta` to the user's points and recomputes the level in the same
    /// write. Returns the updated profile.
    async fn increment_points(&self, user_id: &str, delta: i64) -> AppResult<UserProfile>;
    async fn top_by_points(&self, limit: i64) -> AppResult<Vec<UserProfile>>;
}

pub struct MongoUserRepository {
    collection: Collection<UserProfile>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for users collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let points_index = IndexModel::builder()
            .keys(doc! { "total_points": -1 })
            .options(
                IndexOptions::builder()
                    .name("total_points_desc".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(points_index).await?;

        log::info!("Successfully created indexes for users collection");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, user_id: &str) -> AppResult<Option<UserProfile>> {
        let user = self.collection.find_one(doc! { "id": user_id }).await?;
        Ok(user)
    }

    async fn increment_points(&self, user_id: &str, delta: i64) -> AppResult<UserProfile> {
        let pipeline = vec![
            doc! { "$set": {
                "total_points": { "$add": [{ "$ifNull": ["$total_points", 0_i64] }, delta] }
            } },
            doc! { "$set": {
                "level": { "$toInt": { "$add": [
                    { "$floor": { "$divide": ["$total_points", POINTS_PER_LEVEL] } },
                    1
                ] } }
            } },
        ];

        self.collection
            .find_one_and_update(doc! { "id": user_id }, pipeline)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id '{}' not found", user_id)))
    }

    async fn top_by_points(&self, limit: i64) -> AppResult<Vec<UserProfile>> {
        let users = self
            .collection
            .find(doc! {})
            .sort(doc! { "total_points": -1, "id": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }
}
