use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{User, UserSummary},
    rbac::Role,
};

pub struct UserRepository;

impl UserRepository {
    /// Find a user by username (for login).
    pub async fn find_by_username(pool: &PgPool, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// List users, newest first.
    pub async fn find_all(pool: &PgPool) -> AppResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, role, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Create a new user. The role is fixed here; no endpoint changes it later.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    pub async fn delete_all(executor: impl PgExecutor<'_>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM users").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
