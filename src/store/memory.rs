use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CarStore;
use crate::{
    error::{AppError, Result},
    models::{Car, VoteField},
};

#[derive(Debug, Default)]
struct Arena {
    cars: Vec<Car>,
    index: HashMap<Uuid, usize>,
}

impl Arena {
    fn slot_mut(&mut self, id: Uuid) -> Result<&mut Car> {
        let slot = *self
            .index
            .get(&id)
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;
        Ok(&mut self.cars[slot])
    }
}

/// Cars live in an append-only arena; the index maps ids to slots.
#[derive(Debug, Default)]
pub struct MemoryCarStore {
    arena: RwLock<Arena>,
}

impl MemoryCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.arena.read().await.cars.len()
    }

    #[cfg(test)]
    pub(crate) async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CarStore for MemoryCarStore {
    async fn create(&self, image: String) -> Result<Car> {
        let mut arena = self.arena.write().await;

        let mut car = Car::new(image);
        while arena.index.contains_key(&car.id) {
            car.id = Uuid::new_v4();
        }
        // Keep creation order visible in timestamps even when the clock is coarse.
        if let Some(last) = arena.cars.last() {
            if car.created_at <= last.created_at {
                car.created_at = last.created_at + Duration::microseconds(1);
            }
        }

        let slot = arena.cars.len();
        arena.index.insert(car.id, slot);
        arena.cars.push(car.clone());

        Ok(car)
    }

    async fn get(&self, id: Uuid) -> Result<Car> {
        let arena = self.arena.read().await;
        arena
            .index
            .get(&id)
            .map(|&slot| arena.cars[slot].clone())
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    async fn list(&self) -> Result<Vec<Car>> {
        Ok(self.arena.read().await.cars.clone())
    }

    async fn ids(&self) -> Result<Vec<Uuid>> {
        Ok(self.arena.read().await.cars.iter().map(|car| car.id).collect())
    }

    async fn increment(&self, id: Uuid, field: VoteField) -> Result<Car> {
        let mut arena = self.arena.write().await;
        let car = arena.slot_mut(id)?;

        let counter = match field {
            VoteField::Hot => &mut car.hot_votes,
            VoteField::Not => &mut car.not_votes,
        };
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| AppError::Storage(format!("{} overflow", field.column())))?;

        Ok(car.clone())
    }
}
