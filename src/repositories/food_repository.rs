use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use tracing::{info, instrument};

use super::database::{StoreTracer, FOOD_TABLE};
use crate::models::{Food, RepositoryError, RepositoryResult};
use crate::observability::DatabaseTracingMiddleware;

const SELECT_FOOD: &str = "SELECT Id AS id, Name AS name, DinnerId AS dinner_id FROM Food";

/// Trait defining the interface for food data access operations
///
/// Mutating methods report whether a row was touched instead of failing, so
/// callers decide how a missing row surfaces.
#[async_trait]
pub trait FoodRepository: Send + Sync {
    /// Find all foods regardless of association
    async fn find_all(&self) -> RepositoryResult<Vec<Food>>;

    /// Find a food by its ID
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Food>>;

    /// Insert a new unassociated food
    async fn create(&self, name: &str) -> RepositoryResult<Food>;

    /// Replace the name only
    async fn update_name(&self, id: i64, name: &str) -> RepositoryResult<bool>;

    /// Point the food at a dinner, replacing any previous owner
    async fn assign_dinner(&self, id: i64, dinner_id: i64) -> RepositoryResult<bool>;

    /// Detach the food, but only while it still belongs to `dinner_id`
    async fn unassign_dinner(&self, id: i64, dinner_id: i64) -> RepositoryResult<bool>;

    /// Hard delete a food
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    /// Check if a food exists
    async fn exists(&self, id: i64) -> RepositoryResult<bool>;
}

/// SQLite implementation of the FoodRepository trait
pub struct SqliteFoodRepository {
    pool: SqlitePool,
    tracer: StoreTracer,
}

impl SqliteFoodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tracer: StoreTracer::new(FOOD_TABLE),
        }
    }

    /// Record per-operation database metrics
    pub fn with_db_tracing(mut self, db_tracing: DatabaseTracingMiddleware) -> Self {
        self.tracer = self.tracer.with_db_tracing(db_tracing);
        self
    }
}

#[async_trait]
impl FoodRepository for SqliteFoodRepository {
    #[instrument(skip(self), fields(table = FOOD_TABLE))]
    async fn find_all(&self) -> RepositoryResult<Vec<Food>> {
        info!("Finding all foods");

        let foods = self
            .tracer
            .run("SELECT", async {
                let query = format!("{} ORDER BY Id", SELECT_FOOD);
                sqlx::query_as::<_, Food>(&query)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .await?;

        info!("Found {} foods", foods.len());
        Ok(foods)
    }

    #[instrument(skip(self), fields(table = FOOD_TABLE, food_id = id))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Food>> {
        self.tracer
            .run("SELECT", async {
                let query = format!("{} WHERE Id = ?", SELECT_FOOD);
                sqlx::query_as::<_, Food>(&query)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self, name), fields(table = FOOD_TABLE))]
    async fn create(&self, name: &str) -> RepositoryResult<Food> {
        let id = self
            .tracer
            .run("INSERT", async {
                sqlx::query("INSERT INTO Food (Name) VALUES (?)")
                    .bind(name)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.last_insert_rowid())
                    .map_err(RepositoryError::from)
            })
            .await?;

        info!(food_id = id, "Food inserted");
        Ok(Food::new(id, name))
    }

    #[instrument(skip(self, name), fields(table = FOOD_TABLE, food_id = id))]
    async fn update_name(&self, id: i64, name: &str) -> RepositoryResult<bool> {
        self.tracer
            .run("UPDATE", async {
                sqlx::query("UPDATE Food SET Name = ? WHERE Id = ?")
                    .bind(name)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.rows_affected() > 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self), fields(table = FOOD_TABLE, food_id = id, dinner_id = dinner_id))]
    async fn assign_dinner(&self, id: i64, dinner_id: i64) -> RepositoryResult<bool> {
        self.tracer
            .run("UPDATE", async {
                sqlx::query("UPDATE Food SET DinnerId = ? WHERE Id = ?")
                    .bind(dinner_id)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.rows_affected() > 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self), fields(table = FOOD_TABLE, food_id = id, dinner_id = dinner_id))]
    async fn unassign_dinner(&self, id: i64, dinner_id: i64) -> RepositoryResult<bool> {
        self.tracer
            .run("UPDATE", async {
                sqlx::query("UPDATE Food SET DinnerId = NULL WHERE Id = ? AND DinnerId = ?")
                    .bind(id)
                    .bind(dinner_id)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.rows_affected() > 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self), fields(table = FOOD_TABLE, food_id = id))]
    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        self.tracer
            .run("DELETE", async {
                sqlx::query("DELETE FROM Food WHERE Id = ?")
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.rows_affected() > 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self), fields(table = FOOD_TABLE, food_id = id))]
    async fn exists(&self, id: i64) -> RepositoryResult<bool> {
        self.tracer
            .run("SELECT", async {
                sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM Food WHERE Id = ?)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map(|found| found != 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }
}
