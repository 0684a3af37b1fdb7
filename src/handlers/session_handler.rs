use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::{
    app_state::AppState, auth::AuthenticatedUser, errors::AppError,
    models::dto::response::SessionStartResponse,
};

/// Opens a session: quiz metadata plus a fresh random draw of questions.
#[get("/api/quizzes/{id}")]
async fn start_session(
    state: web::Data<Arc<AppState>>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let sampled = state.sampler.sample(&quiz_id).await?;

    log::info!(
        "User '{}' started quiz '{}' with {} question(s)",
        auth.id(),
        sampled.quiz.id,
        sampled.questions.len()
    );

    Ok(HttpResponse::Ok().json(SessionStartResponse {
        quiz: sampled.quiz,
        questions: sampled.questions,
    }))
}
