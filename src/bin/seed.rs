//! Reset the database to a known set of users and posts.

use postgate::{
    config::Config,
    db::{self, DEMO_USERS},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postgate=info,postgate_seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::migrate(&pool).await?;

    db::reset_demo_data(&pool).await?;

    println!("Database seeded successfully!");
    println!();
    println!("Login credentials:");
    for (username, password, role) in DEMO_USERS {
        println!("{role}: username={username}, password={password}");
    }

    Ok(())
}
