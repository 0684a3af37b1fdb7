#[cfg(test)]
pub mod fixtures {
    use chrono::Utc;

    use crate::models::domain::{
        Difficulty, Question, QuestionOption, QuestionType, QuizDefinition, QuizResult,
    };

    /// Active quiz: 1 minute, pass at 60%, 10 reward points.
    pub fn test_quiz(id: &str) -> QuizDefinition {
        QuizDefinition {
            id: id.to_string(),
            title: "Rust Fundamentals".to_string(),
            description: Some("Ownership, borrowing and lifetimes".to_string()),
            category: "programming".to_string(),
            difficulty: Difficulty::Medium,
            time_limit_minutes: 1,
            passing_score: 60.0,
            points: 10,
            is_active: true,
            created_at: Some(Utc::now()),
        }
    }

    /// Two-option question whose correct option id is `<id>-right`.
    pub fn test_question(quiz_id: &str, id: &str, order: i32) -> Question {
        Question {
            id: id.to_string(),
            quiz_id: quiz_id.to_string(),
            text: format!("What does {} print?", id),
            question_type: QuestionType::SingleChoice,
            points: 1,
            order,
            options: vec![
                QuestionOption {
                    id: format!("{}-right", id),
                    label: "A".to_string(),
                    text: "The right answer".to_string(),
                    is_correct: true,
                },
                QuestionOption {
                    id: format!("{}-wrong", id),
                    label: "B".to_string(),
                    text: "A wrong answer".to_string(),
                    is_correct: false,
                },
            ],
            created_at: None,
        }
    }

    pub fn test_result(id: &str, user_id: &str, percentage: f64) -> QuizResult {
        let passed = percentage >= 60.0;
        QuizResult {
            id: id.to_string(),
            user_id: user_id.to_string(),
            quiz_id: "quiz-1".to_string(),
            submission_id: None,
            score: (percentage / 10.0) as i32,
            total_questions: 10,
            correct_answers: (percentage / 10.0) as i32,
            wrong_answers: 10 - (percentage / 10.0) as i32,
            time_taken_seconds: 42,
            percentage,
            passed,
            points_earned: if passed { 10 } else { 0 },
            answers: vec![],
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_question_has_exactly_one_correct_option() {
        let question = test_question("quiz-1", "q-1", 1);
        let correct: Vec<_> = question.options.iter().filter(|o| o.is_correct).collect();

        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].id, "q-1-right");
    }

    #[test]
    fn test_result_passes_at_threshold() {
        assert!(test_result("r-1", "user-1", 60.0).passed);
        assert!(!test_result("r-2", "user-1", 50.0).passed);
    }
}
