mod config;

use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use codedrop_db::Database;
use codedrop_repo::Repository;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codedrop=debug,codedrop_db=debug,codedrop_repo=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = if config.in_memory() {
        Database::open_in_memory()?
    } else {
        Database::open(&config.db_path)?
    }
    .with_dedup(
        Duration::minutes(config.dedup_window_minutes),
        config.similar_limit,
    );

    let repo = Repository::new(Arc::new(db));

    // Schema problems are logged by the store; keep going in degraded mode
    if let Some(e) = repo.init().await.error() {
        warn!("Starting without a clean schema bootstrap: {}", e);
    }

    let queue = repo.review_queue().await;
    if queue.is_degraded() {
        warn!("Review queue unavailable at startup");
    }
    let queue = queue.into_value();
    info!(
        "codedrop store ready ({} pending, {} reviewed, dedup window {}m, limit {})",
        queue.pending.len(),
        queue.reviewed.len(),
        config.dedup_window_minutes,
        config.similar_limit
    );

    Ok(())
}
