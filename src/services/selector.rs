use rand::{Rng, seq::IndexedRandom};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::Car,
    store::CarStore,
};

/// Uniform draw over a snapshot of ids; every id has probability `1/N`.
pub fn choose_id<R: Rng + ?Sized>(ids: &[Uuid], rng: &mut R) -> Option<Uuid> {
    ids.choose(rng).copied()
}

/// Picks a car to vote on, uniformly at random and without regard to age,
/// score or what the caller saw last. Fails with [`AppError::Empty`] when
/// nothing has been uploaded yet.
pub async fn pick_random(store: &dyn CarStore) -> Result<Car> {
    let ids = store.ids().await?;

    let id = {
        let mut rng = rand::rng();
        choose_id(&ids, &mut rng)
    }
    .ok_or(AppError::Empty)?;

    store.get(id).await
}
