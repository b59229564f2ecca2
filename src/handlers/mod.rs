pub mod dinner;
pub mod errors;
pub mod food;
pub mod health;
pub mod metrics;
pub mod middleware;

pub use errors::{error_response, service_error_to_response, ApiError};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use middleware::{
    cors_middleware, request_validation_middleware, security_headers_middleware, RequestLimits,
};

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::observability::{observability_middleware, Metrics};
use crate::services::{DinnerService, FoodService};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub dinner_service: Arc<DinnerService>,
    pub food_service: Arc<FoodService>,
    pub pool: SqlitePool,
    pub metrics: Arc<Metrics>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

/// Build the full router: dinner and food endpoints, health and metrics,
/// and the middleware stack (outermost first: observability, validation,
/// CORS, security headers)
pub fn create_app(state: AppState, server: &ServerConfig) -> Router {
    let metrics = state.metrics.clone();
    let limits = RequestLimits {
        max_request_size: server.max_request_size,
    };

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route(
            "/Dinner",
            get(dinner::list_dinners).post(dinner::create_dinner),
        )
        .route(
            "/Dinner/:id",
            get(dinner::get_dinner)
                .put(dinner::update_dinner)
                .delete(dinner::delete_dinner),
        )
        .route(
            "/Dinner/:dinner_id/foods/:food_id",
            post(dinner::add_food_to_dinner).delete(dinner::remove_food_from_dinner),
        )
        .route("/api/Food", get(food::list_foods).post(food::create_food))
        .route(
            "/api/Food/:id",
            get(food::get_food)
                .put(food::update_food)
                .delete(food::delete_food),
        )
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_request_size))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(cors_middleware))
        .layer(axum_middleware::from_fn_with_state(
            limits,
            request_validation_middleware,
        ))
        .layer(axum_middleware::from_fn(move |req, next| {
            observability_middleware(metrics.clone(), req, next)
        }))
}
