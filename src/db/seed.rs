use sqlx::PgPool;

use crate::{
    auth::hash_password,
    error::AppResult,
    models::User,
    rbac::Role,
    repositories::{PostRepository, UserRepository},
};

/// Demo accounts as (username, password, role).
pub const DEMO_USERS: [(&str, &str, Role); 3] = [
    ("admin", "admin123", Role::Admin),
    ("editor", "editor123", Role::Editor),
    ("viewer", "viewer123", Role::Viewer),
];

/// Replace all users and posts with the demo accounts and two welcome posts.
///
/// Runs in one transaction; on error nothing is changed.
pub async fn reset_demo_data(pool: &PgPool) -> AppResult<Vec<User>> {
    let mut tx = pool.begin().await?;

    let posts = PostRepository::delete_all(&mut *tx).await?;
    let users = UserRepository::delete_all(&mut *tx).await?;
    tracing::info!(posts, users, "Database cleared");

    let mut created = Vec::with_capacity(DEMO_USERS.len());
    for (username, password, role) in DEMO_USERS {
        let hash = hash_password(password)?;
        created.push(UserRepository::create(&mut *tx, username, &hash, role).await?);
    }

    let admin = &created[0];
    let editor = &created[1];

    PostRepository::create(
        &mut *tx,
        admin.id,
        "Welcome to the Postgate RBAC System",
        "This is a post created by the Admin user. It demonstrates the role-based access \
         control system where different users have different permissions.",
    )
    .await?;
    PostRepository::create(
        &mut *tx,
        editor.id,
        "My First Post as an Editor",
        "This post was created by the Editor user. Editors can create, edit, and delete \
         their own posts, but cannot modify posts created by others.",
    )
    .await?;

    tx.commit().await?;
    tracing::info!(users = created.len(), posts = 2, "Demo data created");

    Ok(created)
}
