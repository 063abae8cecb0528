use crate::{
    error::{AppError, Result},
    models::CarResponse,
};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::sync::Arc;
use tokio::sync::Mutex;

const GENERATION_KEY: &str = "hot_cars:leaderboard:gen";

/// Cached copy of the ranked leaderboard, keyed by generation.
///
/// Every upload or vote bumps the generation. A reader takes the generation
/// before listing the store and writes its result under that generation
/// only, so a list computed before a write can never be served after it.
#[async_trait]
pub trait LeaderboardCache: Send + Sync {
    async fn generation(&self) -> Result<u64>;

    async fn get(&self, generation: u64) -> Result<Option<Vec<CarResponse>>>;

    async fn set(&self, generation: u64, entries: &[CarResponse]) -> Result<()>;

    /// Moves to a new generation, orphaning whatever was cached before.
    async fn invalidate(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct RedisLeaderboardCache {
    manager: Arc<Mutex<ConnectionManager>>,
    ttl_seconds: u64,
}

impl RedisLeaderboardCache {
    pub async fn new(redis_url: &str, ttl_seconds: u64) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager: Arc::new(Mutex::new(manager)),
            ttl_seconds,
        })
    }

    fn entries_key(generation: u64) -> String {
        format!("hot_cars:leaderboard:{}", generation)
    }
}

#[async_trait]
impl LeaderboardCache for RedisLeaderboardCache {
    async fn generation(&self) -> Result<u64> {
        let mut conn = self.manager.lock().await;
        let generation: Option<u64> = conn.get(GENERATION_KEY).await?;
        Ok(generation.unwrap_or(0))
    }

    async fn get(&self, generation: u64) -> Result<Option<Vec<CarResponse>>> {
        let mut conn = self.manager.lock().await;
        let value: Option<String> = conn.get(Self::entries_key(generation)).await?;

        Ok(value.and_then(|json| match serde_json::from_str(&json) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!("Discarding unreadable leaderboard cache entry: {}", e);
                None
            }
        }))
    }

    async fn set(&self, generation: u64, entries: &[CarResponse]) -> Result<()> {
        let json = serde_json::to_string(entries).map_err(|e| AppError::Internal(e.to_string()))?;

        let mut conn = self.manager.lock().await;
        let _: () = conn
            .set_ex(Self::entries_key(generation), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn invalidate(&self) -> Result<()> {
        let mut conn = self.manager.lock().await;
        let _: u64 = conn.incr(GENERATION_KEY, 1).await?;
        Ok(())
    }
}
