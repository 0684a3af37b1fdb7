pub mod session_handler;
pub mod submission_handler;
pub mod user_handler;

use actix_web::web;

use crate::errors::AppError;

pub use session_handler::start_session;
pub use submission_handler::{get_result, submit_quiz};
pub use user_handler::{
    get_history, get_leaderboard, get_profile, health_check, health_check_ready,
};

/// Registers every route. Malformed JSON and query strings are reported
/// through `AppError` like every other rejection.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::InvalidRequest(err.to_string()).into()),
    )
    .service(health_check)
    .service(health_check_ready)
    .service(start_session)
    .service(submit_quiz)
    .service(get_result)
    .service(get_history)
    .service(get_profile)
    .service(get_leaderboard);
}
