mod post_repo;
mod user_repo;

pub use post_repo::PostRepository;
pub use user_repo::UserRepository;

/// Outcome kinds the storage layer reports instead of raw driver errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid identifier")]
    InvalidIdentifier,

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
