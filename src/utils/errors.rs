use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::services::{
    credentials::CredentialError, enrollment::EnrollmentError, policy::Deny, tokens::TokenError,
};
use crate::store::StoreError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub enum AppError {
    ValidationError(HashMap<String, Vec<String>>),
    NoToken,
    InvalidToken,
    Forbidden(String),
    NotFound(String),
    NoEnrollments,
    Conflict(String),
    Unauthorized(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match &self {
            AppError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(errors.clone()),
            ),
            AppError::NoToken => (
                StatusCode::UNAUTHORIZED,
                "NO_TOKEN",
                "No token provided".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                "Invalid token".to_string(),
                None,
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::NoEnrollments => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_ENROLLMENTS",
                "Student has no enrolled course units to grade against".to_string(),
                None,
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                msg.clone(),
                None,
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = error_type, %message, "request failed");
        }

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
            timestamp: Utc::now(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut error_map = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("Invalid value for field '{}'", field))
                })
                .collect();
            error_map.insert(field.to_string(), messages);
        }

        AppError::ValidationError(error_map)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<Deny> for AppError {
    fn from(deny: Deny) -> Self {
        match deny {
            Deny::NoToken => AppError::NoToken,
            Deny::InvalidToken => AppError::InvalidToken,
            Deny::Forbidden(reason) => AppError::Forbidden(reason.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::EmailTaken => {
                AppError::Conflict("A user with this email already exists".to_string())
            }
            CredentialError::Hash(_) => {
                AppError::InternalServerError("Failed to hash password".to_string())
            }
            CredentialError::Store(e) => AppError::from(e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> Self {
        match error {
            TokenError::UnknownUser => AppError::NotFound("User not found".to_string()),
            TokenError::Signing(_) => {
                AppError::InternalServerError("Failed to sign token".to_string())
            }
            TokenError::Store(e) => AppError::from(e),
        }
    }
}

impl From<EnrollmentError> for AppError {
    fn from(error: EnrollmentError) -> Self {
        match error {
            EnrollmentError::CourseNotFound => AppError::NotFound("Course not found".to_string()),
            EnrollmentError::StudentNotFound => AppError::NotFound("Student not found".to_string()),
            EnrollmentError::NotRegistered => {
                AppError::NotFound("Student is not registered to the course".to_string())
            }
            EnrollmentError::NoEnrollments => AppError::NoEnrollments,
            EnrollmentError::Store(e) => AppError::from(e),
        }
    }
}
