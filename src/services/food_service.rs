use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    CreateFoodRequest, Food, ServiceError, ServiceResult, UpdateFoodRequest, Validate,
};
use crate::observability::BusinessTracingMiddleware;
use crate::repositories::FoodRepository;

/// Service for managing foods independently of any dinner
pub struct FoodService {
    repository: Arc<dyn FoodRepository>,
    business_tracing: Option<BusinessTracingMiddleware>,
}

impl FoodService {
    pub fn new(repository: Arc<dyn FoodRepository>) -> Self {
        Self {
            repository,
            business_tracing: None,
        }
    }

    pub fn with_business_tracing(mut self, business_tracing: BusinessTracingMiddleware) -> Self {
        self.business_tracing = Some(business_tracing);
        self
    }

    async fn traced<T, F>(&self, operation: &str, food_id: Option<i64>, future: F) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match &self.business_tracing {
            Some(tracing) => tracing.trace_food_operation(operation, food_id, future).await,
            None => future.await,
        }
    }

    /// List every food. No foods is a valid, empty answer.
    #[instrument(skip(self))]
    pub async fn list_foods(&self) -> ServiceResult<Vec<Food>> {
        self.traced("list", None, async {
            let foods = self.repository.find_all().await?;
            crate::info_with_trace!("Found {} foods", foods.len());
            Ok::<_, ServiceError>(foods)
        })
        .await
    }

    #[instrument(skip(self), fields(food_id = id))]
    pub async fn get_food(&self, id: i64) -> ServiceResult<Food> {
        self.traced("get", Some(id), async {
            match self.repository.find_by_id(id).await? {
                Some(food) => Ok(food),
                None => {
                    crate::warn_with_trace!(food_id = id, "Food not found");
                    Err(ServiceError::FoodNotFound { id })
                }
            }
        })
        .await
    }

    #[instrument(skip(self, request))]
    pub async fn create_food(&self, request: CreateFoodRequest) -> ServiceResult<Food> {
        self.traced("create", None, async {
            request.validate()?;

            let food = self.repository.create(&request.name).await?;

            crate::info_with_trace!(food_id = food.id, "Food created");
            Ok::<_, ServiceError>(food)
        })
        .await
    }

    /// Rename a food. A zero-row update on a food that still exists means
    /// another writer got there first and is reported as a conflict.
    #[instrument(skip(self, request), fields(food_id = id))]
    pub async fn update_food(&self, id: i64, request: UpdateFoodRequest) -> ServiceResult<()> {
        self.traced("update", Some(id), async {
            request.validate()?;

            if self.repository.find_by_id(id).await?.is_none() {
                return Err(ServiceError::FoodNotFound { id });
            }

            if self.repository.update_name(id, &request.name).await? {
                crate::info_with_trace!(food_id = id, "Food renamed");
                return Ok(());
            }

            if self.repository.exists(id).await? {
                crate::error_with_trace!(food_id = id, "Food update affected no rows");
                Err(ServiceError::ConcurrencyConflict { entity: "Food", id })
            } else {
                Err(ServiceError::FoodNotFound { id })
            }
        })
        .await
    }

    /// Delete a food, which also drops it from whichever dinner held it
    #[instrument(skip(self), fields(food_id = id))]
    pub async fn delete_food(&self, id: i64) -> ServiceResult<()> {
        self.traced("delete", Some(id), async {
            if !self.repository.delete(id).await? {
                crate::warn_with_trace!(food_id = id, "Food not found for delete");
                return Err(ServiceError::FoodNotFound { id });
            }

            crate::info_with_trace!(food_id = id, "Food deleted");
            Ok::<_, ServiceError>(())
        })
        .await
    }
}
