use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::AppResult,
    models::domain::{AnswerKey, Question, QuizDefinition},
};

/// Read side of the question bank.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_quiz(&self, quiz_id: &str) -> AppResult<Option<QuizDefinition>>;
    /// Identifiers of every question in the quiz's bank.
    async fn list_question_ids(&self, quiz_id: &str) -> AppResult<Vec<String>>;
    /// Full question rows, restricted to `question_ids` within `quiz_id`.
    async fn find_questions(
        &self,
        quiz_id: &str,
        question_ids: &[String],
    ) -> AppResult<Vec<Question>>;
    /// Correct option and point value per question. Server-side only.
    async fn find_answer_keys(
        &self,
        quiz_id: &str,
        question_ids: &[String],
    ) -> AppResult<Vec<AnswerKey>>;
}

pub struct MongoQuizRepository {
    quizzes: Collection<QuizDefinition>,
    questions: Collection<Question>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            quizzes: db.get_collection("quizzes"),
            questions: db.get_collection("questions"),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes and questions collections");

        let quiz_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let question_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let question_quiz_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "order": 1 })
            .options(
                IndexOptions::builder()
                    .name("quiz_order".to_string())
                    .build(),
            )
            .build();

        self.quizzes.create_index(quiz_id_index).await?;
        self.questions.create_index(question_id_index).await?;
        self.questions.create_index(question_quiz_index).await?;

        log::info!("Successfully created indexes for quizzes and questions collections");
        Ok(())
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn find_quiz(&self, quiz_id: &str) -> AppResult<Option<QuizDefinition>> {
        let quiz = self.quizzes.find_one(doc! { "id": quiz_id }).await?;
        Ok(quiz)
    }

    async fn list_question_ids(&self, quiz_id: &str) -> AppResult<Vec<String>> {
        let ids = self
            .questions
            .clone_with_type::<mongodb::bson::Document>()
            .find(doc! { "quiz_id": quiz_id })
            .projection(doc! { "_id": 0, "id": 1 })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .filter_map(|d| d.get_str("id").ok().map(str::to_string))
            .collect();
        Ok(ids)
    }

    async fn find_questions(
        &self,
        quiz_id: &str,
        question_ids: &[String],
    ) -> AppResult<Vec<Question>> {
        if question_ids.is_empty() {
            return Ok(vec![]);
        }

        let questions = self
            .questions
            .find(doc! { "quiz_id": quiz_id, "id": { "$in": question_ids.to_vec() } })
            .sort(doc! { "order": 1, "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn find_answer_keys(
        &self,
        quiz_id: &str,
        question_ids: &[String],
    ) -> AppResult<Vec<AnswerKey>> {
        let questions = self.find_questions(quiz_id, question_ids).await?;
        Ok(questions.iter().map(AnswerKey::from).collect())
    }
}
