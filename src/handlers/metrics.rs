use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, instrument};

use crate::observability::Metrics;

/// Prometheus scrape endpoint. Refreshes the pool gauge before encoding.
#[instrument(name = "metrics_handler", skip(metrics, pool))]
pub async fn metrics_handler(
    State(metrics): State<Arc<Metrics>>,
    State(pool): State<SqlitePool>,
) -> Response {
    let in_use = pool.size().saturating_sub(pool.num_idle() as u32);
    metrics.set_active_connections(f64::from(in_use));

    match metrics.encode() {
        Ok(metrics_text) => (
            StatusCode::OK,
            [(
                header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            metrics_text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
