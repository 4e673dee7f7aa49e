use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role assigned to every user. Roles are ordered by `level`:
/// a user may act on another user's resources when their role level
/// is at least the level required by the operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub level: i32,
}

impl Role {
    pub fn outranks(&self, required: &Role) -> bool {
        self.level >= required.level
    }
}
