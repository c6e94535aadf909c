use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::error::{AppError, AppResult};

const MAX_CONNECTIONS: u32 = 10;

pub async fn create_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .map_err(AppError::from)
}

/// Pool that opens connections on first use instead of at construction.
pub fn create_lazy_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_lazy(database_url)
        .map_err(AppError::from)
}

/// Apply the bundled migrations.
pub async fn migrate(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(e.into()))
}
