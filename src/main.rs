use hot_cars::cache::{LeaderboardCache, RedisLeaderboardCache};
use hot_cars::config::Config;
use hot_cars::database::{create_pool, run_migrations};
use hot_cars::store::{CarStore, MemoryCarStore, PgCarStore};
use hot_cars::{AppState, create_app};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hot_cars=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Configuration loaded successfully");

    // Pick the submission store
    let store: Arc<dyn CarStore> = match &config.database_url {
        Some(database_url) => {
            let db = create_pool(&config, database_url).await?;
            tracing::info!("Database connection pool created");

            run_migrations(&db).await?;
            tracing::info!("Database migrations completed");

            Arc::new(PgCarStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, cars are kept in memory only");
            Arc::new(MemoryCarStore::new())
        }
    };

    // Leaderboard cache is optional; run without it if Redis is unreachable
    let cache = match &config.redis_url {
        Some(redis_url) => {
            match RedisLeaderboardCache::new(redis_url, config.leaderboard_cache_ttl).await {
                Ok(cache) => {
                    tracing::info!("Redis leaderboard cache connected");
                    Some(Arc::new(cache) as Arc<dyn LeaderboardCache>)
                }
                Err(e) => {
                    tracing::warn!("Leaderboard cache disabled: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    // Create application state
    let state = AppState {
        store,
        cache,
        config: Arc::new(config.clone()),
    };

    // Create application
    let app = create_app(state);

    // Create listener
    let listener = TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;
    tracing::info!("Server listening on {}:{}", config.host, config.port);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
