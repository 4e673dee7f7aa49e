use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Role, UserEmail, Username};

/// A registered user, as stored and as returned by the user routes.
/// The password hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    pub email: UserEmail,
    pub is_active: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
