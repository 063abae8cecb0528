use uuid::Uuid;

use crate::{
    cache::LeaderboardCache,
    error::Result,
    models::{Car, VoteField},
    store::CarStore,
};

/// Applies one vote to one car and returns the updated tallies.
///
/// Votes carry no identity, so repeating a call records another vote. The
/// store reports unknown ids as `NotFound` without touching anything, and a
/// failed increment is always propagated.
pub async fn record_vote(
    store: &dyn CarStore,
    cache: Option<&dyn LeaderboardCache>,
    car_id: Uuid,
    is_hot: bool,
) -> Result<Car> {
    let field = VoteField::from(is_hot);
    let car = store.increment(car_id, field).await?;

    tracing::debug!(
        car_id = %car_id,
        field = field.column(),
        hot_votes = car.hot_votes,
        not_votes = car.not_votes,
        "Vote recorded"
    );

    if let Some(cache) = cache {
        if let Err(e) = cache.invalidate().await {
            tracing::warn!("Failed to invalidate leaderboard cache: {}", e);
        }
    }

    Ok(car)
}
