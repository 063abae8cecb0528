use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::services::ranking;

/// A submitted car photo and its vote tallies. Only the counters ever change.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Car {
    pub id: Uuid,
    /// Opaque reference to the photo, produced by the image ingestion step.
    pub image: String,
    pub hot_votes: i64,
    pub not_votes: i64,
    pub created_at: DateTime<Utc>,
}

impl Car {
    pub fn new(image: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            hot_votes: 0,
            not_votes: 0,
            created_at: Utc::now(),
        }
    }

    pub fn total_votes(&self) -> i64 {
        self.hot_votes + self.not_votes
    }
}

/// Which counter a vote lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteField {
    Hot,
    Not,
}

impl VoteField {
    pub fn column(self) -> &'static str {
        match self {
            VoteField::Hot => "hot_votes",
            VoteField::Not => "not_votes",
        }
    }
}

impl From<bool> for VoteField {
    fn from(is_hot: bool) -> Self {
        if is_hot { VoteField::Hot } else { VoteField::Not }
    }
}

// Upload request
#[derive(Debug, Validate, Deserialize)]
pub struct UploadCarRequest {
    /// Base64 image data, either raw or as a `data:image/...;base64,` URL.
    #[validate(length(min = 1, message = "Photo is required"))]
    #[serde(alias = "image")]
    pub photo: String,
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub car_id: String,
    pub is_hot: bool,
}

/// `limit` is taken as text so malformed values get the JSON error body
/// rather than the extractor's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<String>,
}

impl LeaderboardQuery {
    /// Requested number of entries, or `default` when absent.
    pub fn limit_or(&self, default: usize) -> crate::error::Result<usize> {
        let Some(raw) = self.limit.as_deref().map(str::trim) else {
            return Ok(default);
        };

        let limit: i64 = raw.parse().map_err(|_| {
            crate::error::AppError::BadRequest(format!("Invalid limit: {}", raw))
        })?;

        usize::try_from(limit).map_err(|_| {
            crate::error::AppError::BadRequest("Limit must not be negative".to_string())
        })
    }
}

// Car response with derived fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarResponse {
    pub id: Uuid,
    pub photo: String,
    pub hot_votes: i64,
    pub not_votes: i64,
    pub total_votes: i64,
    pub score: f64,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        let score = ranking::score(&car);
        let total_votes = car.total_votes();
        Self {
            id: car.id,
            photo: car.image,
            hot_votes: car.hot_votes,
            not_votes: car.not_votes,
            total_votes,
            score,
        }
    }
}

// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub message: String,
    pub hot_votes: i64,
    pub not_votes: i64,
    pub total_votes: i64,
    pub score: f64,
}

impl From<Car> for VoteResponse {
    fn from(car: Car) -> Self {
        let tally = CarResponse::from(car);
        Self {
            success: true,
            message: "Vote recorded".to_string(),
            hot_votes: tally.hot_votes,
            not_votes: tally.not_votes,
            total_votes: tally.total_votes,
            score: tally.score,
        }
    }
}

/// Parses a client-supplied car id. Anything that is not a UUID cannot name
/// an existing car, so it is reported as not found.
pub fn parse_car_id(raw: &str) -> crate::error::Result<Uuid> {
    raw.trim()
        .parse()
        .map_err(|_| crate::error::AppError::NotFound("Car not found".to_string()))
}
