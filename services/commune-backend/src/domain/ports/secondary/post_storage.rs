use async_trait::async_trait;
use common::err_context::ErrorContext;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::domain::{Comment, FeedQuery, NewPost, Post, PostWithMetadata};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStorage {
    async fn create_post(&self, user_id: &Uuid, post: &NewPost) -> Result<Post, Error>;

    async fn get_post_by_id(&self, id: &Uuid) -> Result<Option<Post>, Error>;

    /// Conditional update: the row is only touched when its stored
    /// version still matches `post.version`. Returns None when another
    /// writer got there first, or the post is gone.
    async fn update_post(&self, post: &Post) -> Result<Option<Post>, Error>;

    /// Returns false when there was nothing to delete. Comments go
    /// with the post through the schema's cascade.
    async fn delete_post(&self, id: &Uuid) -> Result<bool, Error>;

    /// Posts authored by the user or by anyone they follow, filtered
    /// and paginated by the query.
    async fn get_user_feed(
        &self,
        user_id: &Uuid,
        query: &FeedQuery,
    ) -> Result<Vec<PostWithMetadata>, Error>;

    async fn create_comment(
        &self,
        post_id: &Uuid,
        user_id: &Uuid,
        content: &str,
    ) -> Result<Comment, Error>;

    async fn get_comments_by_post_id(&self, post_id: &Uuid) -> Result<Vec<Comment>, Error>;
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
            Error::Miscellaneous { context } => {
                write!(fmt, "Miscellaneous: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<sqlx::Error>> for Error {
    fn from(err: ErrorContext<sqlx::Error>) -> Self {
        match err.1 {
            sqlx::Error::PoolTimedOut => Error::Connection {
                context: format!("PostgreSQL Storage: Connection Timeout: {}", err.0),
                source: err.1.to_string(),
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
