pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    cache::LeaderboardCache,
    config::Config,
    store::{CarStore, MemoryCarStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CarStore>,
    pub cache: Option<Arc<dyn LeaderboardCache>>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State backed by the in-process store, with no cache.
    pub fn in_memory(config: Config) -> Self {
        Self {
            store: Arc::new(MemoryCarStore::new()),
            cache: None,
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid allowed origin: {}", origin);
                None
            }
        })
        .collect::<Vec<_>>();

    cors.allow_origin(origins)
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Base64 inflates the image by 4/3; leave headroom for the JSON envelope.
    let body_limit = state.config.max_image_size / 3 * 4 + 64 * 1024;

    let car_routes = Router::new()
        .route("/api/cars/upload", post(handlers::cars::upload_car))
        .route("/api/cars/random", get(handlers::cars::get_random_car))
        .route("/api/cars/vote", post(handlers::cars::vote_car))
        .route(
            "/api/cars/leaderboard",
            get(handlers::cars::get_leaderboard),
        )
        .route("/api/cars/{car_id}", get(handlers::cars::get_car));

    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(car_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
