use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{Post, PostView, PostWithAuthorRow};

use super::StoreError;

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.content, p.author_id, u.username AS author_username,
           p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

pub struct PostRepository;

impl PostRepository {
    /// List posts newest first, with author names.
    pub async fn find_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostView>, StoreError> {
        let query = format!(
            "{} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2",
            SELECT_WITH_AUTHOR
        );

        let rows = sqlx::query_as::<_, PostWithAuthorRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    pub async fn count(pool: &PgPool) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Load the stored row, the source of truth for ownership checks.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, title, content, author_id, created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    pub async fn find_view(pool: &PgPool, id: Uuid) -> Result<PostView, StoreError> {
        let query = format!("{} WHERE p.id = $1", SELECT_WITH_AUTHOR);

        sqlx::query_as::<_, PostWithAuthorRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(PostView::from)
            .ok_or(StoreError::NotFound)
    }

    /// Create a new post owned by `author_id`.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<Post, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, content)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(author_id)
        .bind(title)
        .bind(content)
        .fetch_one(executor)
        .await?;

        Ok(post)
    }

    /// Update title and/or content. The author is never changed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Post, StoreError> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, author_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_all(executor: impl PgExecutor<'_>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM posts").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
