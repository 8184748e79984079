use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

use crate::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authorization header missing or malformed")]
    MissingOrMalformedAuthHeader,

    #[error("{0}")]
    InvalidOrExpiredToken(AuthError),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ProviderUnavailable(detail) => {
                ApiError::Internal(format!("identity provider unavailable: {detail}"))
            }
            other => ApiError::InvalidOrExpiredToken(other),
        }
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        ApiError::StoreUnavailable(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ApiError {
    /// Message sent to the client. Server-side failures never leak their detail.
    pub fn client_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingOrMalformedAuthHeader => StatusCode::UNAUTHORIZED,
            ApiError::InvalidOrExpiredToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::MissingRequiredField(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidField(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }

        let error_response = ErrorResponse {
            success: false,
            error: self.client_message(),
        };

        HttpResponse::build(status).json(error_response)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
