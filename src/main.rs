use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use quiz_engine::{
    app_state::AppState, config::Config, constants::USER_ID_HEADER, handlers,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    if let Err(err) = config.validate_for_production() {
        log::warn!("Configuration is not production ready: {}", err);
    }

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    let allowed_origin = config.cors_allowed_origin.clone();

    let state = AppState::new(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let state = Arc::new(state);

    log::info!("Starting quiz engine on http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::HeaderName::from_static("x-user-id"),
            ])
            .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(Arc::clone(&state)))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(&format!(
                "%a \"%r\" %s %b %T user=%{{{}}}i",
                USER_ID_HEADER
            )))
            .wrap(cors)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
