use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::rbac::{Principal, Role};

/// User account as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Login name (unique)
    #[schema(example = "editor")]
    pub username: String,
    #[serde(skip_serializing, default)]
    #[schema(ignore)]
    pub password_hash: String,
    /// Role assigned at account creation
    pub role: Role,
    /// Timestamp when the account was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the account was last modified
    pub updated_at: DateTime<Utc>,
}

/// User as listed to administrators
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    #[schema(example = "viewer")]
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role.to_string(),
        }
    }
}
