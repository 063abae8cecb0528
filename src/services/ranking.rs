//! Scoring and leaderboard ordering.
//!
//! Cars are ranked by the composite key `(-score, -total_votes, created_at, id)`.
//! Scores are compared as exact ratios so that, for example, 2/4 and 1/2 tie
//! and fall through to the vote-count tie-break.

use chrono::{DateTime, Utc};
use std::cmp::{Ordering, Reverse};
use uuid::Uuid;

use crate::{
    cache::LeaderboardCache,
    error::Result,
    models::{Car, CarResponse},
    store::CarStore,
};

/// Fraction of hot votes, in `[0, 1]`. Unvoted cars score 0.
pub fn score(car: &Car) -> f64 {
    let total = car.total_votes();
    if total > 0 {
        car.hot_votes as f64 / total as f64
    } else {
        0.0
    }
}

/// `hot / total` kept as a ratio. An unvoted car is `0 / 1`.
#[derive(Debug, Clone, Copy)]
pub struct Score {
    hot: i128,
    total: i128,
}

impl Score {
    pub fn of(car: &Car) -> Self {
        let total = car.hot_votes as i128 + car.not_votes as i128;
        if total > 0 {
            Self {
                hot: car.hot_votes as i128,
                total,
            }
        } else {
            Self { hot: 0, total: 1 }
        }
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying preserves order.
        (self.hot * other.total).cmp(&(other.hot * self.total))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

pub type RankKey = (Reverse<Score>, Reverse<i64>, DateTime<Utc>, Uuid);

pub fn rank_key(car: &Car) -> RankKey {
    (
        Reverse(Score::of(car)),
        Reverse(car.total_votes()),
        car.created_at,
        car.id,
    )
}

/// Sorts cars into leaderboard order. The key is a total order, so the
/// result depends only on the cars' ids, timestamps and tallies.
pub fn rank(mut cars: Vec<Car>) -> Vec<Car> {
    cars.sort_by_cached_key(rank_key);
    cars
}

pub async fn leaderboard(store: &dyn CarStore, limit: usize) -> Result<Vec<CarResponse>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let cars = store.list().await?;

    Ok(rank(cars)
        .into_iter()
        .take(limit)
        .map(CarResponse::from)
        .collect())
}

/// Serves the leaderboard through the cache when one is configured.
///
/// The cache holds the top `cache_size` entries; smaller limits are slices
/// of it and larger ones are ranked straight from the store. Cache failures
/// are logged and the store is used instead.
pub async fn cached_leaderboard(
    store: &dyn CarStore,
    cache: Option<&dyn LeaderboardCache>,
    limit: usize,
    cache_size: usize,
) -> Result<Vec<CarResponse>> {
    let cache = match cache {
        Some(cache) if limit > 0 && limit <= cache_size => cache,
        _ => return leaderboard(store, limit).await,
    };

    // Taken before listing, so the result is only ever filed under a
    // generation that was current when the store was read.
    let generation = match cache.generation().await {
        Ok(generation) => generation,
        Err(e) => {
            tracing::warn!("Leaderboard cache unavailable: {}", e);
            return leaderboard(store, limit).await;
        }
    };

    match cache.get(generation).await {
        Ok(Some(mut entries)) => {
            entries.truncate(limit);
            return Ok(entries);
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!("Leaderboard cache read failed: {}", e);
            return leaderboard(store, limit).await;
        }
    }

    let mut entries = leaderboard(store, cache_size).await?;
    if let Err(e) = cache.set(generation, &entries).await {
        tracing::warn!("Leaderboard cache write failed: {}", e);
    }

    entries.truncate(limit);
    Ok(entries)
}
