use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use core_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    /// Rejected before any store is touched
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Vector not found: {0}")]
    NotFound(String),

    /// A backing store failed or could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    /// HTTP status for transports that do not go through [`AppError`].
    pub fn status_code(&self) -> StatusCode {
        match self {
            VectorError::Validation(_) => StatusCode::BAD_REQUEST,
            VectorError::NotFound(_) => StatusCode::NOT_FOUND,
            VectorError::StoreUnavailable(_)
            | VectorError::Config(_)
            | VectorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to callers; backend detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            VectorError::Validation(msg) => msg.clone(),
            VectorError::NotFound(id) => format!("Vector '{}' not found", id),
            VectorError::StoreUnavailable(_) | VectorError::Config(_) | VectorError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl From<qdrant_client::QdrantError> for VectorError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        VectorError::StoreUnavailable(format!("Qdrant error: {}", err))
    }
}

impl From<sea_orm::DbErr> for VectorError {
    fn from(err: sea_orm::DbErr) -> Self {
        VectorError::StoreUnavailable(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::Internal(format!("JSON error: {}", err))
    }
}

impl From<ConfigError> for VectorError {
    fn from(err: ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}

/// Convert VectorError to AppError for standardized HTTP error responses
impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Validation(msg) => AppError::BadRequest(msg),
            VectorError::NotFound(id) => AppError::NotFound(format!("Vector '{}' not found", id)),
            VectorError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            VectorError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            VectorError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for VectorError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
