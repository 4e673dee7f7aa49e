use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the post creation route receives.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewPost {
    /// Titles are capped at 100 characters and content at 1000,
    /// matching the limits enforced at the storage schema.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if self.title.chars().count() > 100 {
            return Err("title must not exceed 100 characters".to_string());
        }
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        if self.content.chars().count() > 1000 {
            return Err("content must not exceed 1000 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    /// Bumped on every successful update, and checked by conditional
    /// updates so two concurrent editors cannot silently overwrite
    /// each other.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A feed entry: a post along with the author's username and how many
/// comments it has gathered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostWithMetadata {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub post: Post,
    pub author: String,
    pub comment_count: i64,
}

/// What the post update route receives. Absent fields keep their
/// current value.
#[derive(Debug, Clone, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    /// Same limits as NewPost, applied only to the fields present.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err("title must not be empty".to_string());
            }
            if title.chars().count() > 100 {
                return Err("title must not exceed 100 characters".to_string());
            }
        }
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err("content must not be empty".to_string());
            }
            if content.chars().count() > 1000 {
                return Err("content must not exceed 1000 characters".to_string());
            }
        }
        Ok(())
    }
}
