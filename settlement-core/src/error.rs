use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transition denied: {0}")]
    TransitionDenied(String),

    #[error("Precondition failed: {message}")]
    PreconditionFailed {
        message: String,
        blockers: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed {
        message: String,
        violations: Vec<String>,
    },

    #[error("Partial failure: {message}")]
    PartialFailure {
        message: String,
        committed: String,
    },

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Forbidden: {0}")]
    Forbidden(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            violations: Vec<String>,
        }

        let (status, error_message, details, violations) = match self {
            AppError::TransitionDenied(msg) => {
                (StatusCode::CONFLICT, msg, None, Vec::new())
            }
            AppError::PreconditionFailed { message, blockers } => (
                StatusCode::CONFLICT,
                message,
                Some(format!("{} blocker(s)", blockers.len())),
                blockers,
            ),
            AppError::ValidationFailed {
                message,
                violations,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                message,
                Some(format!("{} violation(s)", violations.len())),
                violations,
            ),
            AppError::PartialFailure { message, committed } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                message,
                Some(format!("committed: {}", committed)),
                Vec::new(),
            ),
            AppError::BadRequest(err) => {
                (StatusCode::BAD_REQUEST, err.to_string(), None, Vec::new())
            }
            AppError::NotFound(err) => {
                (StatusCode::NOT_FOUND, err.to_string(), None, Vec::new())
            }
            AppError::Forbidden(err) => {
                (StatusCode::FORBIDDEN, err.to_string(), None, Vec::new())
            }
            AppError::Conflict(err) => {
                (StatusCode::CONFLICT, err.to_string(), None, Vec::new())
            }
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(format!("{:#?}", err)),
                Vec::new(),
            ),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                Some(err.to_string()),
                Vec::new(),
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Configuration error".to_string(),
                Some(err.to_string()),
                Vec::new(),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
                violations,
            }),
        )
            .into_response()
    }
}
