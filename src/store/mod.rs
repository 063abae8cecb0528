//! Submission store: the durable mapping from car id to [`Car`].
//!
//! Two backends implement [`CarStore`]: [`PgCarStore`] for Postgres and
//! [`MemoryCarStore`], an in-process arena used when no database is
//! configured and by the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{Car, VoteField},
};

pub use memory::MemoryCarStore;
pub use postgres::PgCarStore;

/// Object-safe so handlers can share it as `Arc<dyn CarStore>`.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Persists a new car with zeroed counters and a fresh id.
    async fn create(&self, image: String) -> Result<Car>;

    async fn get(&self, id: Uuid) -> Result<Car>;

    /// All cars, in no particular order.
    async fn list(&self) -> Result<Vec<Car>>;

    /// Snapshot of every id currently stored.
    async fn ids(&self) -> Result<Vec<Uuid>>;

    /// Atomically bumps one counter by 1 and returns the updated car.
    /// Concurrent increments are never lost.
    async fn increment(&self, id: Uuid, field: VoteField) -> Result<Car>;
}
