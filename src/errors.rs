use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

const TRY_AGAIN_LATER: &str = "Could not generate the quiz right now, please try again later";

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Model provider error: {0}")]
    ProviderError(String),

    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),

    /// The model answered, but nothing usable could be recovered from the text.
    #[error("Unparsable model response: {reason}")]
    UnparsableResponse { reason: String, raw: String },

    #[error("Answer check failed: {0}")]
    AnswerCheckError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            AppError::ProviderError(_) => "PROVIDER_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::UnparsableResponse { .. } => "UNPARSABLE_RESPONSE",
            AppError::AnswerCheckError(_) => "ANSWER_CHECK_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Generation failures that may succeed on a fresh prompt/response cycle.
    pub fn is_retryable_generation_failure(&self) -> bool {
        matches!(
            self,
            AppError::ProviderError(_) | AppError::Timeout(_) | AppError::UnparsableResponse { .. }
        )
    }

    fn public_message(&self) -> String {
        if self.is_retryable_generation_failure() {
            TRY_AGAIN_LATER.to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub status: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ProviderError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UnparsableResponse { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AnswerCheckError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.public_message(),
            code: self.error_code(),
            status: self.status_code().as_u16(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;
