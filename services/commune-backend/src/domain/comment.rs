use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the comment creation route receives.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("content must not be empty".to_string());
        }
        if self.content.chars().count() > 200 {
            return Err("content must not exceed 200 characters".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// Author's username, joined in by the storage layer.
    pub author: String,
    pub created_at: DateTime<Utc>,
}
