use serde::Serialize;
use std::fmt;

use crate::authentication::jwt::Error as JwtError;
use common::err_context::ErrorContext;

#[derive(Clone, Debug, Serialize)]
pub enum Error {
    TokenNotFound,
    InvalidToken { context: String },
}

impl From<ErrorContext<JwtError>> for Error {
    fn from(err: ErrorContext<JwtError>) -> Self {
        Error::InvalidToken {
            context: format!("{}: {}", err.0, err.1),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TokenNotFound => {
                write!(fmt, "Token not found")
            }
            Error::InvalidToken { context } => {
                write!(fmt, "Invalid Token: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}
