use std::sync::Arc;

use actix_web::{get, post, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    models::dto::{request::SubmitQuizRequest, response::SubmissionResponse},
};

#[post("/api/quiz/submit")]
async fn submit_quiz(
    state: web::Data<Arc<AppState>>,
    request: web::Json<SubmitQuizRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let outcome = state.scorer.submit(auth.id(), request.into_inner()).await?;
    let response = SubmissionResponse::from(&outcome.result);

    // Achievement evaluation keeps running after the handle is dropped.
    drop(outcome.achievement_task);

    if outcome.replayed {
        Ok(HttpResponse::Ok().json(response))
    } else {
        Ok(HttpResponse::Created().json(response))
    }
}

#[get("/api/results/{id}")]
async fn get_result(
    state: web::Data<Arc<AppState>>,
    result_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let result = state.progress.result_for_user(auth.id(), &result_id).await?;
    Ok(HttpResponse::Ok().json(result))
}
