use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::CarStore;
use crate::{
    error::{AppError, Result},
    models::{Car, VoteField},
};

#[derive(Clone)]
pub struct PgCarStore {
    db: PgPool,
}

impl PgCarStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CarStore for PgCarStore {
    async fn create(&self, image: String) -> Result<Car> {
        let car = Car::new(image);

        let car = sqlx::query_as::<_, Car>(
            r#"
            INSERT INTO cars (id, image, hot_votes, not_votes, created_at)
            VALUES ($1, $2, 0, 0, $3)
            RETURNING *
            "#,
        )
        .bind(car.id)
        .bind(&car.image)
        .bind(car.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(car)
    }

    async fn get(&self, id: Uuid) -> Result<Car> {
        sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }

    async fn list(&self) -> Result<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>("SELECT * FROM cars")
            .fetch_all(&self.db)
            .await?;

        Ok(cars)
    }

    async fn ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM cars")
            .fetch_all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn increment(&self, id: Uuid, field: VoteField) -> Result<Car> {
        // Single statement, so Postgres serializes concurrent bumps on the row.
        let query = match field {
            VoteField::Hot => {
                "UPDATE cars SET hot_votes = hot_votes + 1 WHERE id = $1 RETURNING *"
            }
            VoteField::Not => {
                "UPDATE cars SET not_votes = not_votes + 1 WHERE id = $1 RETURNING *"
            }
        };

        sqlx::query_as::<_, Car>(query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))
    }
}
