use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use validator::Validate;

use crate::{
    AppState,
    error::Result,
    models::{
        CarResponse, LeaderboardQuery, UploadCarRequest, VoteRequest, VoteResponse, parse_car_id,
    },
    services::{ranking, selector, upload_service::UploadService, vote_service},
};

pub async fn upload_car(
    State(state): State<AppState>,
    Json(payload): Json<UploadCarRequest>,
) -> Result<(StatusCode, Json<CarResponse>)> {
    payload.validate()?;

    let upload_service = UploadService::from_config(&state.config);
    let car = upload_service
        .upload_car(state.store.as_ref(), state.cache.as_deref(), &payload.photo)
        .await?;

    Ok((StatusCode::CREATED, Json(CarResponse::from(car))))
}

pub async fn get_random_car(State(state): State<AppState>) -> Result<Json<CarResponse>> {
    let car = selector::pick_random(state.store.as_ref()).await?;

    Ok(Json(CarResponse::from(car)))
}

pub async fn get_car(
    State(state): State<AppState>,
    Path(car_id): Path<String>,
) -> Result<Json<CarResponse>> {
    let car_id = parse_car_id(&car_id)?;
    let car = state.store.get(car_id).await?;

    Ok(Json(CarResponse::from(car)))
}

pub async fn vote_car(
    State(state): State<AppState>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let car_id = parse_car_id(&payload.car_id)?;

    let car = vote_service::record_vote(
        state.store.as_ref(),
        state.cache.as_deref(),
        car_id,
        payload.is_hot,
    )
    .await?;

    Ok(Json(VoteResponse::from(car)))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<CarResponse>>> {
    let limit = params.limit_or(state.config.leaderboard_default_limit)?;

    let cars = ranking::cached_leaderboard(
        state.store.as_ref(),
        state.cache.as_deref(),
        limit,
        state.config.leaderboard_cache_size,
    )
    .await?;

    Ok(Json(cars))
}
