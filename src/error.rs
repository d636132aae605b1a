//!
//! # Custom Error Handling
//!
//! This module defines `AppError`, the single error type every handler and store
//! function returns. Each variant maps to one HTTP status and is rendered as a JSON
//! body of the form `{"error": "<message>"}`.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers simply return
//! `Result<_, AppError>` and use `?`. `From` implementations cover `sqlx::Error`,
//! `validator::ValidationErrors`, `bcrypt::BcryptError` and the token service's
//! `TokenError`. Storage and internal failures are logged with their detail but
//! answered with a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::{ValidationError, ValidationErrors};

use crate::auth::token::TokenError;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, malformed or expired token (HTTP 401). Also used for bad credentials.
    Unauthorized(String),
    /// Valid token whose role is not allowed to perform the operation (HTTP 403).
    Forbidden(String),
    /// Malformed or missing input (HTTP 400).
    BadRequest(String),
    /// A uniqueness or referential rule would be broken (HTTP 400).
    Conflict(String),
    /// The referenced entity does not exist (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the storage engine (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg) => msg.as_str(),
            // Internal detail stays in the logs.
            AppError::InternalServerError(msg) | AppError::DatabaseError(msg) => {
                log::error!("{}", msg);
                "Internal Server Error"
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; unique violations and deletes blocked by a
/// foreign key become `Conflict`; a write pointing at a missing row becomes
/// `NotFound`; everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => AppError::Conflict("Resource already exists".into()),
                // Postgres reports a dangling reference on write as "insert or update
                // on table ..." and a blocked delete as "update or delete on table ...".
                Some(FOREIGN_KEY_VIOLATION) if db_err.message().starts_with("insert or update") => {
                    AppError::NotFound("Referenced record not found".into())
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    AppError::Conflict("Resource is still referenced by other records".into())
                }
                _ => AppError::DatabaseError(error.to_string()),
            },
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Renders one failed field check as a short sentence, e.g. `title must not be empty`.
fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return format!("{} {}", field, message);
    }
    let param = |key: &str| error.params.get(key).and_then(|value| value.as_u64());
    match error.code.as_ref() {
        "length" => {
            let len = error
                .params
                .get("value")
                .and_then(|value| value.as_str())
                .map(|value| value.chars().count() as u64);
            match (len, param("min"), param("max")) {
                (Some(0), Some(_), _) => format!("{} must not be empty", field),
                (Some(len), _, Some(max)) if len > max => {
                    format!("{} must be at most {} characters", field, max)
                }
                (_, Some(min), _) => format!("{} must be at least {} characters", field, min),
                _ => format!("{} has an invalid length", field),
            }
        }
        "email" => format!("{} must be a valid email address", field),
        _ => format!("{} is invalid", field),
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let message = fields
            .iter()
            .flat_map(|(field, errors)| errors.iter().map(move |error| describe(field, error)))
            .collect::<Vec<_>>()
            .join("; ");
        AppError::BadRequest(message)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => {
                AppError::InternalServerError(format!("Failed to issue token: {}", msg))
            }
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}
