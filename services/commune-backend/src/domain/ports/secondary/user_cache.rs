use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::User;

/// A read-through cache for user records, sitting in front of the
/// user storage so hot lookups skip the database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache {
    async fn get(&self, id: &Uuid) -> Result<Option<User>, Error>;

    async fn set(&self, user: &User) -> Result<(), Error>;

    async fn invalidate(&self, id: &Uuid) -> Result<(), Error>;
}

#[derive(Clone, Debug, Serialize)]
pub enum Error {
    Miscellaneous { context: String },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Miscellaneous { context } => {
                write!(fmt, "Cache: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}
