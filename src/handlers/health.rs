use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tracing::{error, instrument};

use crate::repositories::ping;

/// Liveness plus a store round trip; 503 when the database is unreachable
#[instrument(name = "health_check", skip(pool))]
pub async fn health_check(State(pool): State<SqlitePool>) -> (StatusCode, Json<Value>) {
    let (status, database) = match ping(&pool).await {
        Ok(()) => (StatusCode::OK, "up"),
        Err(e) => {
            error!(error = %e, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "down")
        }
    };

    let health = if status == StatusCode::OK {
        "healthy"
    } else {
        "unhealthy"
    };

    (
        status,
        Json(json!({
            "status": health,
            "service": "dinnerfood-rs",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
