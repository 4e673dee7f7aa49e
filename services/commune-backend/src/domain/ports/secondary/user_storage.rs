use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::err_context::ErrorContext;
use secrecy::Secret;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::{NewUser, Role, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage {
    /// Store a new, inactive user along with an invitation token.
    /// Both rows are written in a single transaction.
    async fn create_and_invite(
        &self,
        user: &NewUser,
        password_hash: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<User, Error>;

    /// Activate the user behind an unexpired invitation token, and
    /// burn the token. Returns None when no such invitation exists.
    async fn activate_by_token(&self, token: &str) -> Result<Option<User>, Error>;

    async fn get_by_id(&self, id: &Uuid) -> Result<Option<User>, Error>;

    /// Remove a user and everything hanging off them. Used to undo a
    /// registration whose invitation email could not be delivered.
    async fn delete(&self, id: &Uuid) -> Result<(), Error>;

    async fn follow(&self, user_id: &Uuid, follower_id: &Uuid) -> Result<(), Error>;

    async fn unfollow(&self, user_id: &Uuid, follower_id: &Uuid) -> Result<(), Error>;

    async fn get_role_by_name(&self, name: &str) -> Result<Role, Error>;

    async fn email_exists(&self, email: &str) -> Result<bool, Error>;

    async fn username_exists(&self, username: &str) -> Result<bool, Error>;

    /// Id and password hash of the active user with this email, if any.
    /// Inactive users cannot log in, so they are not reported here.
    async fn get_credentials(
        &self,
        email: &str,
    ) -> Result<Option<(Uuid, Secret<String>)>, Error>;
}

#[derive(Clone, Debug, Serialize)]
pub enum Error {
    /// Error returned by sqlx
    Database {
        context: String,
        source: String,
    },
    Connection {
        context: String,
        source: String,
    },
    /// A unique constraint was violated
    Duplicate {
        context: String,
    },
    Missing {
        context: String,
    },
    Validation {
        context: String,
    },
    Miscellaneous {
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Database { context, source } => {
                write!(fmt, "Database: {context} | {source}")
            }
            Error::Connection { context, source } => {
                write!(fmt, "Database Connection: {context} | {source}")
            }
            Error::Duplicate { context } => {
                write!(fmt, "Duplicate: {context}")
            }
            Error::Missing { context } => {
                write!(fmt, "Missing: {context}")
            }
            Error::Validation { context } => {
                write!(fmt, "Data: {context}")
            }
            Error::Miscellaneous { context } => {
                write!(fmt, "Miscellaneous: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<sqlx::Error>> for Error {
    fn from(err: ErrorContext<sqlx::Error>) -> Self {
        match &err.1 {
            sqlx::Error::PoolTimedOut => Error::Connection {
                context: format!("PostgreSQL Storage: Connection Timeout: {}", err.0),
                source: err.1.to_string(),
            },
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::Duplicate {
                context: format!("PostgreSQL Storage: {}", err.0),
            },
            sqlx::Error::Database(_) => Error::Database {
                context: format!("PostgreSQL Storage: Database: {}", err.0),
                source: err.1.to_string(),
            },
            _ => Error::Database {
                context: format!("PostgreSQL Storage: Miscellaneous: {}", err.0),
                source: err.1.to_string(),
            },
        }
    }
}
