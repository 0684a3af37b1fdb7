use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::{
    constants::{QUESTION_SAMPLE_SIZE, VIOLATION_LIMIT},
    errors::{AppError, AppResult},
};

const DEFAULT_MONGO_CONN_STRING: &str = "mongodb://localhost:27017";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: SecretString,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub question_sample_size: usize,
    pub integrity_violation_limit: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: SecretString::from(
                env::var("MONGO_CONN_STRING")
                    .unwrap_or_else(|_| DEFAULT_MONGO_CONN_STRING.to_string()),
            ),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "quiz-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            question_sample_size: env::var("QUESTION_SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(QUESTION_SAMPLE_SIZE),
            integrity_violation_limit: env::var("INTEGRITY_VIOLATION_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit| *limit > 0)
                .unwrap_or(VIOLATION_LIMIT),
        }
    }

    /// Rejects configuration that is only fit for local development.
    pub fn validate_for_production(&self) -> AppResult<()> {
        if self.mongo_conn_string.expose_secret() == DEFAULT_MONGO_CONN_STRING {
            return Err(AppError::InternalError(
                "MONGO_CONN_STRING is using the local default".to_string(),
            ));
        }

        if self.cors_allowed_origin == "*" {
            return Err(AppError::InternalError(
                "CORS_ALLOWED_ORIGIN must name a concrete origin".to_string(),
            ));
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: SecretString::from(DEFAULT_MONGO_CONN_STRING.to_string()),
            mongo_db_name: "quiz-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            cors_allowed_origin: "http://localhost:3000".to_string(),
            question_sample_size: QUESTION_SAMPLE_SIZE,
            integrity_violation_limit: VIOLATION_LIMIT,
        }
    }
}
