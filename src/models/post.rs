use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::repositories::StoreError;

/// Parse a client-supplied post identifier.
pub fn parse_post_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidIdentifier)
}

/// Post row as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post row joined with its author's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithAuthorRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author reference embedded in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: Uuid,
    #[schema(example = "editor")]
    pub username: String,
}

/// Post as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostView {
    pub id: Uuid,
    #[schema(example = "My First Post as an Editor")]
    pub title: String,
    #[schema(example = "Post content here")]
    pub content: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostWithAuthorRow> for PostView {
    fn from(row: PostWithAuthorRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePost {
    #[schema(example = "My Post")]
    #[serde(default)]
    pub title: String,
    #[schema(example = "Post content here")]
    #[serde(default)]
    pub content: String,
}

impl CreatePost {
    /// Trimmed (title, content), or `None` when either is blank.
    pub fn normalized(&self) -> Option<(&str, &str)> {
        let title = self.title.trim();
        let content = self.content.trim();
        (!title.is_empty() && !content.is_empty()).then_some((title, content))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePost {
    #[schema(example = "Updated Title")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[schema(example = "Updated content")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdatePost {
    /// Trimmed replacement values. Blank fields are left unchanged.
    pub fn normalized(&self) -> (Option<&str>, Option<&str>) {
        fn field(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }
        (field(&self.title), field(&self.content))
    }
}
