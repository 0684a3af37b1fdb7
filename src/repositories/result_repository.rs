use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{is_duplicate_key, Database},
    errors::{AppError, AppResult},
    models::domain::QuizResult,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Persists a result together with its embedded answers in one write.
    /// A repeated `(user_id, submission_id)` pair fails with `AlreadyExists`.
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizResult>>;
    async fn find_by_submission_id(
        &self,
        user_id: &str,
        submission_id: &str,
    ) -> AppResult<Option<QuizResult>>;
    /// Every result of the user, newest first.
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<QuizResult>>;
    async fn list_for_user_paginated(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizResult>, i64)>;
}

pub struct MongoResultRepository {
    collection: Collection<QuizResult>,
}

impl MongoResultRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("results");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for results collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let user_created_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_created".to_string())
                    .build(),
            )
            .build();

        let submission_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "submission_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "submission_id": { "$exists": true } })
                    .name("user_submission_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(user_created_index).await?;
        self.collection.create_index(submission_index).await?;

        log::info!("Successfully created indexes for results collection");
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for MongoResultRepository {
    async fn create(&self, result: QuizResult) -> AppResult<QuizResult> {
        match self.collection.insert_one(&result).await {
            Ok(_) => Ok(result),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Result for submission '{}' already exists",
                result.submission_id.as_deref().unwrap_or(&result.id)
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizResult>> {
        let result = self.collection.find_one(doc! { "id": id }).await?;
        Ok(result)
    }

    async fn find_by_submission_id(
        &self,
        user_id: &str,
        submission_id: &str,
    ) -> AppResult<Option<QuizResult>> {
        let result = self
            .collection
            .find_one(doc! { "user_id": user_id, "submission_id": submission_id })
            .await?;
        Ok(result)
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<QuizResult>> {
        let results = self
            .collection
            .find(doc! { "user_id": user_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(results)
    }

    async fn list_for_user_paginated(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizResult>, i64)> {
        let filter = doc! { "user_id": user_id };

        let total = self.collection.count_documents(filter.clone()).await?;

        let results = self
            .collection
            .find(filter)
            .skip(offset.max(0) as u64)
            .limit(limit)
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((results, total as i64))
    }
}
