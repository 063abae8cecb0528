use sqlx::{PgPool, Postgres, pool::PoolOptions, postgres::PgPoolOptions};
use std::time::Duration;

use crate::config::Config;

/// Connects the car store's pool using the sizing from `Config`.
pub async fn create_pool(config: &Config, database_url: &str) -> Result<PgPool, sqlx::Error> {
    pool_options(config).connect(database_url).await
}

fn pool_options(config: &Config) -> PoolOptions<Postgres> {
    let max_connections = config.database_max_connections.max(1);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(config.database_min_connections.min(max_connections))
        .acquire_timeout(Duration::from_secs(config.database_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(600))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
