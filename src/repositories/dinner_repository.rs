use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::database::{StoreTracer, DINNER_TABLE};
use crate::models::{Dinner, Food, RepositoryError, RepositoryResult};
use crate::observability::DatabaseTracingMiddleware;

const SELECT_DINNER: &str = "SELECT Id AS id, Name AS name FROM Dinner";
const SELECT_ATTACHED_FOOD: &str =
    "SELECT Id AS id, Name AS name, DinnerId AS dinner_id FROM Food WHERE DinnerId";

/// Trait defining the interface for dinner data access operations.
/// Dinners are always returned with their foods loaded.
#[async_trait]
pub trait DinnerRepository: Send + Sync {
    async fn find_all(&self) -> RepositoryResult<Vec<Dinner>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Dinner>>;

    /// Insert a new dinner with no foods
    async fn create(&self, name: &str) -> RepositoryResult<Dinner>;

    /// Replace the name only; the food set is not touched
    async fn update_name(&self, id: i64, name: &str) -> RepositoryResult<bool>;

    /// Detach the dinner's foods and delete the dinner in one transaction
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;

    async fn exists(&self, id: i64) -> RepositoryResult<bool>;
}

#[derive(Debug, FromRow)]
struct DinnerRow {
    id: i64,
    name: String,
}

impl DinnerRow {
    fn into_dinner(self, foods: Vec<Food>) -> Dinner {
        Dinner::new(self.id, self.name).with_foods(foods)
    }
}

/// SQLite implementation of the DinnerRepository trait
pub struct SqliteDinnerRepository {
    pool: SqlitePool,
    tracer: StoreTracer,
}

impl SqliteDinnerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tracer: StoreTracer::new(DINNER_TABLE),
        }
    }

    pub fn with_db_tracing(mut self, db_tracing: DatabaseTracingMiddleware) -> Self {
        self.tracer = self.tracer.with_db_tracing(db_tracing);
        self
    }
}

/// Group attached foods by owning dinner
fn group_by_dinner(foods: Vec<Food>) -> HashMap<i64, Vec<Food>> {
    let mut grouped: HashMap<i64, Vec<Food>> = HashMap::new();
    for food in foods {
        if let Some(dinner_id) = food.dinner_id {
            grouped.entry(dinner_id).or_default().push(food);
        }
    }
    grouped
}

#[async_trait]
impl DinnerRepository for SqliteDinnerRepository {
    #[instrument(skip(self), fields(table = DINNER_TABLE))]
    async fn find_all(&self) -> RepositoryResult<Vec<Dinner>> {
        info!("Finding all dinners with foods");

        let (rows, foods) = self
            .tracer
            .run("SELECT", async {
                let dinners_query = format!("{} ORDER BY Id", SELECT_DINNER);
                let rows = sqlx::query_as::<_, DinnerRow>(&dinners_query)
                    .fetch_all(&self.pool)
                    .await?;

                let foods_query = format!("{} IS NOT NULL ORDER BY Id", SELECT_ATTACHED_FOOD);
                let foods = sqlx::query_as::<_, Food>(&foods_query)
                    .fetch_all(&self.pool)
                    .await?;

                Ok::<_, RepositoryError>((rows, foods))
            })
            .await?;

        let mut grouped = group_by_dinner(foods);
        let dinners: Vec<Dinner> = rows
            .into_iter()
            .map(|row| {
                let foods = grouped.remove(&row.id).unwrap_or_default();
                row.into_dinner(foods)
            })
            .collect();

        info!("Found {} dinners", dinners.len());
        Ok(dinners)
    }

    #[instrument(skip(self), fields(table = DINNER_TABLE, dinner_id = id))]
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Dinner>> {
        self.tracer
            .run("SELECT", async {
                let dinner_query = format!("{} WHERE Id = ?", SELECT_DINNER);
                let row = sqlx::query_as::<_, DinnerRow>(&dinner_query)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;

                let Some(row) = row else {
                    return Ok(None);
                };

                let foods_query = format!("{} = ? ORDER BY Id", SELECT_ATTACHED_FOOD);
                let foods = sqlx::query_as::<_, Food>(&foods_query)
                    .bind(id)
                    .fetch_all(&self.pool)
                    .await?;

                Ok::<_, RepositoryError>(Some(row.into_dinner(foods)))
            })
            .await
    }

    #[instrument(skip(self, name), fields(table = DINNER_TABLE))]
    async fn create(&self, name: &str) -> RepositoryResult<Dinner> {
        let id = self
            .tracer
            .run("INSERT", async {
                sqlx::query("INSERT INTO Dinner (Name) VALUES (?)")
                    .bind(name)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.last_insert_rowid())
                    .map_err(RepositoryError::from)
            })
            .await?;

        info!(dinner_id = id, "Dinner inserted");
        Ok(Dinner::new(id, name))
    }

    #[instrument(skip(self, name), fields(table = DINNER_TABLE, dinner_id = id))]
    async fn update_name(&self, id: i64, name: &str) -> RepositoryResult<bool> {
        self.tracer
            .run("UPDATE", async {
                sqlx::query("UPDATE Dinner SET Name = ? WHERE Id = ?")
                    .bind(name)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map(|result| result.rows_affected() > 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }

    #[instrument(skip(self), fields(table = DINNER_TABLE, dinner_id = id))]
    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let (detached, deleted) = self
            .tracer
            .run("DELETE", async {
                let mut tx = self.pool.begin().await?;

                let detached = sqlx::query("UPDATE Food SET DinnerId = NULL WHERE DinnerId = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                let deleted = sqlx::query("DELETE FROM Dinner WHERE Id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                tx.commit().await?;
                Ok::<_, RepositoryError>((detached, deleted))
            })
            .await?;

        if deleted > 0 {
            info!(detached_foods = detached, "Dinner delete committed");
        } else {
            debug!(rows_deleted = deleted, "No dinner row to delete");
        }
        Ok(deleted > 0)
    }

    #[instrument(skip(self), fields(table = DINNER_TABLE, dinner_id = id))]
    async fn exists(&self, id: i64) -> RepositoryResult<bool> {
        self.tracer
            .run("SELECT", async {
                sqlx::query_scalar::<_, i64>("SELECT EXISTS(SELECT 1 FROM Dinner WHERE Id = ?)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await
                    .map(|found| found != 0)
                    .map_err(RepositoryError::from)
            })
            .await
    }
}
