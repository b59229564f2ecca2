use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use dinnerfood_rs::{
    create_app, init_observability,
    observability::{BusinessTracingMiddleware, DatabaseTracingMiddleware, Metrics},
    repositories::{connect, SqliteDinnerRepository, SqliteFoodRepository},
    services::{DinnerService, FoodService},
    shutdown_observability, AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_environment().context("Failed to load configuration")?;

    init_observability(
        &config.observability.service_name,
        &config.observability.service_version,
        config.observability.otlp_endpoint.as_deref(),
        &config.observability.log_level,
        config.observability.enable_json_logging,
    )
    .context("Failed to initialize observability")?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );

    let metrics = Arc::new(Metrics::new().context("Failed to register metrics")?);

    let pool = connect(&config.database)
        .await
        .context("Failed to open database")?;
    info!(
        max_connections = config.database.max_connections,
        "Database ready"
    );

    let db_tracing = DatabaseTracingMiddleware::new(metrics.clone());
    let dinner_repository =
        Arc::new(SqliteDinnerRepository::new(pool.clone()).with_db_tracing(db_tracing.clone()));
    let food_repository =
        Arc::new(SqliteFoodRepository::new(pool.clone()).with_db_tracing(db_tracing));

    let business_tracing = BusinessTracingMiddleware::new(metrics.clone());
    let dinner_service = Arc::new(
        DinnerService::new(dinner_repository, food_repository.clone())
            .with_business_tracing(business_tracing.clone()),
    );
    let food_service =
        Arc::new(FoodService::new(food_repository).with_business_tracing(business_tracing));
    info!("Services initialized successfully");

    let state = AppState {
        dinner_service,
        food_service,
        pool: pool.clone(),
        metrics,
    };
    let app = create_app(state, &config.server);

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address()))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    shutdown_observability().await;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
