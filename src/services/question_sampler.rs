use std::sync::Arc;

use rand::seq::IndexedRandom;

use crate::{
    errors::{AppError, AppResult},
    models::{domain::QuizDefinition, dto::response::PublicQuestion},
    repositories::QuizRepository,
};

/// Quiz metadata plus the questions drawn for one session.
#[derive(Debug, Clone)]
pub struct SampledQuiz {
    pub quiz: QuizDefinition,
    pub questions: Vec<PublicQuestion>,
}

pub struct QuestionSampler {
    repository: Arc<dyn QuizRepository>,
    sample_size: usize,
}

impl QuestionSampler {
    pub fn new(repository: Arc<dyn QuizRepository>, sample_size: usize) -> Self {
        Self {
            repository,
            sample_size,
        }
    }

    /// Draws up to `sample_size` distinct questions from the quiz's bank.
    ///
    /// Only the drawn questions are fetched in full, and their options are
    /// stripped of correctness before leaving this function. An empty bank
    /// yields an empty question list rather than an error.
    pub async fn sample(&self, quiz_id: &str) -> AppResult<SampledQuiz> {
        let quiz = self
            .repository
            .find_quiz(quiz_id)
            .await?
            .filter(|quiz| quiz.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;

        let mut bank = self.repository.list_question_ids(quiz_id).await?;
        bank.sort_unstable();
        bank.dedup();

        if bank.is_empty() {
            log::warn!("Quiz '{}' has no questions to sample", quiz_id);
            return Ok(SampledQuiz {
                quiz,
                questions: vec![],
            });
        }

        let picked = draw(&bank, self.sample_size);
        let mut questions = self.repository.find_questions(quiz_id, &picked).await?;
        questions.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        log::debug!(
            "Sampled {} of {} questions for quiz '{}'",
            questions.len(),
            bank.len(),
            quiz_id
        );

        Ok(SampledQuiz {
            quiz,
            questions: questions.into_iter().map(PublicQuestion::from).collect(),
        })
    }
}

/// Uniform draw of `amount` ids without replacement.
fn draw(bank: &[String], amount: usize) -> Vec<String> {
    let mut rng = rand::rng();
    bank.choose_multiple(&mut rng, amount).cloned().collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{
        models::domain::{Difficulty, Question, QuestionOption, QuestionType},
        repositories::MockQuizRepository,
    };

    fn make_quiz(is_active: bool) -> QuizDefinition {
        QuizDefinition {
            id: "quiz-1".to_string(),
            title: "Ownership".to_string(),
            description: None,
            category: "rust".to_string(),
            difficulty: Difficulty::Medium,
            time_limit_minutes: 10,
            passing_score: 60.0,
            points: 10,
            is_active,
            created_at: None,
        }
    }

    fn make_question(id: &str, order: i32) -> Question {
        Question {
            id: id.to_string(),
            quiz_id: "quiz-1".to_string(),
            text: format!("Question {}", id),
            question_type: QuestionType::SingleChoice,
            points: 1,
            order,
            options: vec![
                QuestionOption {
                    id: format!("{}-b", id),
                    label: "B".to_string(),
                    text: "second".to_string(),
                    is_correct: true,
                },
                QuestionOption {
                    id: format!("{}-a", id),
                    label: "A".to_string(),
                    text: "first".to_string(),
                    is_correct: false,
                },
            ],
            created_at: None,
        }
    }

    fn bank(size: usize) -> Vec<String> {
        (0..size).map(|i| format!("q-{:02}", i)).collect()
    }

    fn repository_with_bank(size: usize) -> MockQuizRepository {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_quiz()
            .returning(|_| Ok(Some(make_quiz(true))));
        repo.expect_list_question_ids()
            .returning(move |_| Ok(bank(size)));
        repo.expect_find_questions().returning(|_, ids| {
            Ok(ids
                .iter()
                .enumerate()
                .map(|(i, id)| make_question(id, 100 - i as i32))
                .collect())
        });
        repo
    }

    #[tokio::test]
    async fn sample_size_is_capped_at_ten() {
        let sampler = QuestionSampler::new(Arc::new(repository_with_bank(25)), 10);

        let sampled = sampler.sample("quiz-1").await.expect("sample should work");

        assert_eq!(sampled.questions.len(), 10);
        let unique: HashSet<_> = sampled.questions.iter().map(|q| q.id.clone()).collect();
        assert_eq!(unique.len(), 10);
    }

    #[tokio::test]
    async fn small_bank_is_returned_whole() {
        let sampler = QuestionSampler::new(Arc::new(repository_with_bank(4)), 10);

        let sampled = sampler.sample("quiz-1").await.expect("sample should work");

        let mut ids: Vec<_> = sampled.questions.iter().map(|q| q.id.clone()).collect();
        ids.sort();
        assert_eq!(ids, bank(4));
    }

    #[tokio::test]
    async fn questions_follow_display_order_and_options_follow_labels() {
        let sampler = QuestionSampler::new(Arc::new(repository_with_bank(6)), 10);

        let sampled = sampler.sample("quiz-1").await.expect("sample should work");

        let orders: Vec<_> = sampled.questions.iter().map(|q| q.order).collect();
        let mut sorted = orders.clone();
        sorted.sort();
        assert_eq!(orders, sorted);
        for question in &sampled.questions {
            assert_eq!(question.options[0].label, "A");
            assert_eq!(question.options[1].label, "B");
        }
    }

    #[tokio::test]
    async fn only_sampled_ids_are_fetched() {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_quiz()
            .returning(|_| Ok(Some(make_quiz(true))));
        repo.expect_list_question_ids()
            .returning(|_| Ok(bank(30)));
        repo.expect_find_questions()
            .withf(|quiz_id, ids| quiz_id.to_string() == "quiz-1" && ids.len() == 3)
            .times(1)
            .returning(|_, ids| Ok(ids.iter().map(|id| make_question(id, 1)).collect()));

        let sampler = QuestionSampler::new(Arc::new(repo), 3);
        let sampled = sampler.sample("quiz-1").await.expect("sample should work");

        assert_eq!(sampled.questions.len(), 3);
    }

    #[tokio::test]
    async fn inactive_quiz_is_not_found() {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_quiz()
            .returning(|_| Ok(Some(make_quiz(false))));
        repo.expect_list_question_ids().never();

        let sampler = QuestionSampler::new(Arc::new(repo), 10);
        let result = sampler.sample("quiz-1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_quiz_is_not_found() {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_quiz().returning(|_| Ok(None));

        let sampler = QuestionSampler::new(Arc::new(repo), 10);
        let result = sampler.sample("nope").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_bank_yields_no_questions() {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_quiz()
            .returning(|_| Ok(Some(make_quiz(true))));
        repo.expect_list_question_ids().returning(|_| Ok(vec![]));
        repo.expect_find_questions().never();

        let sampler = QuestionSampler::new(Arc::new(repo), 10);
        let sampled = sampler.sample("quiz-1").await.expect("sample should work");

        assert!(sampled.questions.is_empty());
        assert_eq!(sampled.quiz.id, "quiz-1");
    }

    #[test]
    fn draw_never_repeats() {
        let ids = bank(12);
        for _ in 0..50 {
            let picked = draw(&ids, 10);
            let unique: HashSet<_> = picked.iter().collect();
            assert_eq!(picked.len(), 10);
            assert_eq!(unique.len(), 10);
        }
    }
}
