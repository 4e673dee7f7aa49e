use axum::extract::Json;
use axum::http::status::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::application::server::middleware::resolve_context::Error as ResolveError;
use crate::authentication::jwt::Error as JwtError;
use crate::authentication::password::Error as PasswordError;
use crate::domain::ports::secondary::{CacheError, EmailError, PostError, UserError};
use common::err_context::ErrorContext;

#[derive(Debug, Serialize)]
pub enum Error {
    Credentials {
        context: String,
        source: PasswordError,
    },
    // This occurs when the credentials are not present in the context
    Context {
        context: String,
        source: ResolveError,
    },
    Token {
        context: String,
        source: JwtError,
    },
    DuplicateEmail {
        context: String,
    },
    DuplicateUsername {
        context: String,
    },
    WeakPassword {
        context: String,
    },
    InvalidRequest {
        context: String,
        source: String,
    },
    NotFound {
        context: String,
    },
    Conflict {
        context: String,
    },
    Forbidden {
        context: String,
    },
    Data {
        context: String,
        source: UserError,
    },
    PostData {
        context: String,
        source: PostError,
    },
    Cache {
        context: String,
        source: CacheError,
    },
    Email {
        context: String,
        source: EmailError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Credentials { context, source } => {
                write!(fmt, "Credentials: {context} {source}")
            }
            Error::Context { context, source } => {
                write!(fmt, "Context: {context} {source}")
            }
            Error::Token { context, source } => {
                write!(fmt, "Token: {context} {source}")
            }
            Error::DuplicateEmail { context } => {
                write!(fmt, "Duplicate email: {context} ")
            }
            Error::DuplicateUsername { context } => {
                write!(fmt, "Duplicate username: {context} ")
            }
            Error::WeakPassword { context } => {
                write!(fmt, "Weak password: {context} ")
            }
            Error::InvalidRequest { context, source } => {
                write!(fmt, "Invalid Request: {context} {source}")
            }
            Error::NotFound { context } => {
                write!(fmt, "Not Found: {context} ")
            }
            Error::Conflict { context } => {
                write!(fmt, "Conflict: {context} ")
            }
            Error::Forbidden { context } => {
                write!(fmt, "Forbidden: {context} ")
            }
            Error::Data { context, source } => {
                write!(fmt, "Data: {context} {source}")
            }
            Error::PostData { context, source } => {
                write!(fmt, "Data: {context} {source}")
            }
            Error::Cache { context, source } => {
                write!(fmt, "Cache: {context} {source}")
            }
            Error::Email { context, source } => {
                write!(fmt, "Email: {context} {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.standardize().into_response()
    }
}

impl From<ErrorContext<ResolveError>> for Error {
    fn from(err: ErrorContext<ResolveError>) -> Self {
        Error::Context {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<UserError>> for Error {
    fn from(err: ErrorContext<UserError>) -> Self {
        Error::Data {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<PostError>> for Error {
    fn from(err: ErrorContext<PostError>) -> Self {
        Error::PostData {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<CacheError>> for Error {
    fn from(err: ErrorContext<CacheError>) -> Self {
        Error::Cache {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<String>> for Error {
    fn from(err: ErrorContext<String>) -> Self {
        Error::InvalidRequest {
            context: err.0,
            source: err.1,
        }
    }
}

impl From<ErrorContext<EmailError>> for Error {
    fn from(err: ErrorContext<EmailError>) -> Self {
        Error::Email {
            context: err.0,
            source: err.1,
        }
    }
}

impl Error {
    pub fn standardize(&self) -> (StatusCode, Json<Value>) {
        match self {
            Error::Credentials { context, source: _ } => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/invalid_credentials"
                })),
            ),
            Error::Context { context, source: _ } => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/missing_credentials"
                })),
            ),
            Error::Token { context, source: _ } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/internal_error"
                })),
            ),
            Error::DuplicateEmail { context } => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/duplicate_email"
                })),
            ),
            Error::DuplicateUsername { context } => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/duplicate_username"
                })),
            ),
            Error::WeakPassword { context } => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/weak_password"
                })),
            ),
            Error::InvalidRequest { context, source: _ } => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "request/invalid"
                })),
            ),
            Error::NotFound { context } => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "resource/not_found"
                })),
            ),
            Error::Conflict { context } => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "resource/conflict"
                })),
            ),
            Error::Forbidden { context } => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "auth/forbidden"
                })),
            ),
            Error::Data { context, source: _ } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "storage/internal_error"
                })),
            ),
            Error::PostData { context, source: _ } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "storage/internal_error"
                })),
            ),
            Error::Cache { context, source: _ } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "cache/internal_error"
                })),
            ),
            Error::Email { context, source: _ } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "fail",
                    "message": context,
                    "code": "email/internal_error"
                })),
            ),
        }
    }
}
