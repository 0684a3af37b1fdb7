use std::sync::Arc;

use actix_web::{get, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState, auth::AuthenticatedUser, errors::AppError,
    models::dto::request::PaginationParams,
};

#[get("/api/user/history")]
async fn get_history(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner();
    pagination.validate()?;

    let response = state.progress.history(auth.id(), &pagination).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/user/profile")]
async fn get_profile(
    state: web::Data<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let response = state.progress.profile(auth.id()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/leaderboard")]
async fn get_leaderboard(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let leaderboard = state.progress.leaderboard().await?;
    Ok(HttpResponse::Ok().json(leaderboard))
}

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[get("/health/ready")]
async fn health_check_ready(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let db_health = state.health_check().await;

    let status = if db_health.is_ok() {
        "ready"
    } else {
        "not_ready"
    };

    let response = serde_json::json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "mongodb": if db_health.is_ok() { "ok" } else { "error" }
        }
    });

    if db_health.is_ok() {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
