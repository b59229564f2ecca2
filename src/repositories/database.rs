use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::future::Future;
use std::str::FromStr;
use tracing::{info, Instrument};

use crate::config::DatabaseConfig;
use crate::models::RepositoryResult;
use crate::observability::DatabaseTracingMiddleware;

pub const DINNER_TABLE: &str = "Dinner";
pub const FOOD_TABLE: &str = "Food";

/// Open the SQLite pool described by `config` and bring the schema up to date.
///
/// In-memory databases live and die with their connection, so they are pinned
/// to a single connection that is never recycled.
pub async fn connect(config: &DatabaseConfig) -> RepositoryResult<SqlitePool> {
    info!("Connecting to database");

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await?;

    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    info!(in_memory = config.is_in_memory(), "Database pool ready");
    Ok(pool)
}

/// Convenience pool for tests and local experiments
pub async fn connect_in_memory() -> RepositoryResult<SqlitePool> {
    connect(&DatabaseConfig::in_memory()).await
}

/// Apply the bundled schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> RepositoryResult<()> {
    info!("Applying database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Round-trip a trivial query to check the store is reachable
pub async fn ping(pool: &SqlitePool) -> RepositoryResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Wraps every store call in a client span and, when metrics are wired in,
/// records the call's outcome and latency.
#[derive(Clone)]
pub(crate) struct StoreTracer {
    table: &'static str,
    db_tracing: Option<DatabaseTracingMiddleware>,
}

impl StoreTracer {
    pub(crate) fn new(table: &'static str) -> Self {
        Self {
            table,
            db_tracing: None,
        }
    }

    pub(crate) fn with_db_tracing(mut self, db_tracing: DatabaseTracingMiddleware) -> Self {
        self.db_tracing = Some(db_tracing);
        self
    }

    fn create_span(&self, operation: &str) -> tracing::Span {
        tracing::info_span!(
            "SQLite",
            "db.system" = "sqlite",
            "db.operation" = operation,
            "db.sql.table" = self.table,
            "otel.kind" = "client",
            "otel.name" = format!("SQLite.{}", operation),
        )
    }

    pub(crate) async fn run<T, F>(&self, operation: &'static str, future: F) -> RepositoryResult<T>
    where
        F: Future<Output = RepositoryResult<T>> + Send,
        T: Send,
    {
        let span = self.create_span(operation);
        match &self.db_tracing {
            Some(db_tracing) => {
                db_tracing
                    .trace_operation(operation, self.table, future)
                    .instrument(span)
                    .await
            }
            None => future.instrument(span).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::Metrics;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_connect_in_memory_applies_schema() {
        let pool = connect_in_memory().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('Dinner', 'Food') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["Dinner".to_string(), "Food".to_string()]);
        assert!(ping(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        assert!(run_migrations(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = connect_in_memory().await.unwrap();

        let result = sqlx::query("INSERT INTO Food (Name, DinnerId) VALUES ('Orphan', 999)")
            .execute(&pool)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_store_tracer_records_metrics() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let tracer = StoreTracer::new(FOOD_TABLE)
            .with_db_tracing(DatabaseTracingMiddleware::new(metrics.clone()));

        let value = tracer.run("select", async { Ok(5) }).await.unwrap();
        assert_eq!(value, 5);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("database_operations_total"));
    }
}
