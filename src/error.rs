//! Application error type and its HTTP mapping.
//!
//! Client errors carry a readable message; store and internal failures are
//! logged here and replaced by a generic message before leaving the process.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::jwt::TokenError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    /// Same message for unknown email and wrong password.
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("User for this token no longer exists")]
    UserNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Referenced user does not exist")]
    ForeignKeyViolation,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::UserNotFound => "user_not_found",
            AppError::NotFound(_) => "not_found",
            AppError::ForeignKeyViolation => "foreign_key_violation",
            AppError::Database(_) | AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::ForeignKeyViolation => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::Unauthenticated(_)
            | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                error!(error = %e, "database error");
                "An internal error occurred".to_string()
            }
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                return AppError::DuplicateEmail;
            }
            if db_err.is_foreign_key_violation() {
                return AppError::ForeignKeyViolation;
            }
            if db_err.is_check_violation() {
                return AppError::Validation(format!(
                    "value rejected by constraint {}",
                    db_err.constraint().unwrap_or("unknown")
                ));
            }
        }
        AppError::Database(e)
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        AppError::Unauthenticated(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(e: FormRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.public_message(),
            },
        };
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}
