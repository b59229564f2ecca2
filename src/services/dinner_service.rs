use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    CreateDinnerRequest, Dinner, RepositoryError, ServiceError, ServiceResult,
    UpdateDinnerRequest, Validate,
};
use crate::observability::BusinessTracingMiddleware;
use crate::repositories::{DinnerRepository, FoodRepository};

/// Service for managing dinners and the foods attached to them
pub struct DinnerService {
    dinners: Arc<dyn DinnerRepository>,
    foods: Arc<dyn FoodRepository>,
    business_tracing: Option<BusinessTracingMiddleware>,
}

impl DinnerService {
    pub fn new(dinners: Arc<dyn DinnerRepository>, foods: Arc<dyn FoodRepository>) -> Self {
        Self {
            dinners,
            foods,
            business_tracing: None,
        }
    }

    /// Count each operation's outcome in `dinner_operations_total`
    pub fn with_business_tracing(mut self, business_tracing: BusinessTracingMiddleware) -> Self {
        self.business_tracing = Some(business_tracing);
        self
    }

    async fn traced<T, F>(
        &self,
        operation: &str,
        dinner_id: Option<i64>,
        future: F,
    ) -> ServiceResult<T>
    where
        F: Future<Output = ServiceResult<T>>,
    {
        match &self.business_tracing {
            Some(tracing) => {
                tracing
                    .trace_dinner_operation(operation, dinner_id, future)
                    .await
            }
            None => future.await,
        }
    }

    async fn load_dinner(&self, id: i64) -> ServiceResult<Dinner> {
        match self.dinners.find_by_id(id).await? {
            Some(dinner) => Ok(dinner),
            None => {
                crate::warn_with_trace!(dinner_id = id, "Dinner not found");
                Err(ServiceError::DinnerNotFound { id })
            }
        }
    }

    /// List every dinner with its foods. An empty store is reported as
    /// `NoDinnersFound` rather than an empty list.
    #[instrument(skip(self))]
    pub async fn list_dinners(&self) -> ServiceResult<Vec<Dinner>> {
        self.traced("list", None, async {
            let dinners = self.dinners.find_all().await?;

            if dinners.is_empty() {
                crate::info_with_trace!("No dinners stored");
                return Err(ServiceError::NoDinnersFound);
            }

            crate::info_with_trace!("Found {} dinners", dinners.len());
            Ok::<_, ServiceError>(dinners)
        })
        .await
    }

    #[instrument(skip(self), fields(dinner_id = id))]
    pub async fn get_dinner(&self, id: i64) -> ServiceResult<Dinner> {
        self.traced("get", Some(id), self.load_dinner(id)).await
    }

    #[instrument(skip(self, request))]
    pub async fn create_dinner(&self, request: CreateDinnerRequest) -> ServiceResult<Dinner> {
        self.traced("create", None, async {
            request.validate()?;

            let dinner = self.dinners.create(&request.name).await?;

            crate::info_with_trace!(dinner_id = dinner.id, "Dinner created");
            Ok::<_, ServiceError>(dinner)
        })
        .await
    }

    /// Rename a dinner; its foods are left alone
    #[instrument(skip(self, request), fields(dinner_id = id))]
    pub async fn update_dinner(&self, id: i64, request: UpdateDinnerRequest) -> ServiceResult<()> {
        self.traced("update", Some(id), async {
            request.validate()?;

            if !self.dinners.exists(id).await? {
                return Err(ServiceError::DinnerNotFound { id });
            }

            if !self.dinners.update_name(id, &request.name).await? {
                // Deleted between the existence check and the update
                return Err(ServiceError::DinnerNotFound { id });
            }

            crate::info_with_trace!(dinner_id = id, "Dinner renamed");
            Ok::<_, ServiceError>(())
        })
        .await
    }

    /// Delete a dinner, leaving its foods in place without an owner
    #[instrument(skip(self), fields(dinner_id = id))]
    pub async fn delete_dinner(&self, id: i64) -> ServiceResult<()> {
        self.traced("delete", Some(id), async {
            if !self.dinners.delete(id).await? {
                crate::warn_with_trace!(dinner_id = id, "Dinner not found for delete");
                return Err(ServiceError::DinnerNotFound { id });
            }

            crate::info_with_trace!(dinner_id = id, "Dinner deleted");
            Ok::<_, ServiceError>(())
        })
        .await
    }

    /// Attach a food to a dinner, moving it away from any dinner it
    /// previously belonged to
    #[instrument(skip(self), fields(dinner_id = dinner_id, food_id = food_id))]
    pub async fn add_food_to_dinner(&self, dinner_id: i64, food_id: i64) -> ServiceResult<()> {
        self.traced("add_food", Some(dinner_id), async {
            if !self.dinners.exists(dinner_id).await? {
                crate::warn_with_trace!(dinner_id = dinner_id, "Dinner not found");
                return Err(ServiceError::DinnerNotFound { id: dinner_id });
            }

            let food = self
                .foods
                .find_by_id(food_id)
                .await?
                .ok_or(ServiceError::FoodNotFound { id: food_id })?;

            if food.belongs_to(dinner_id) {
                return Err(ServiceError::DuplicateAssociation { dinner_id, food_id });
            }

            let attached = match self.foods.assign_dinner(food_id, dinner_id).await {
                Ok(attached) => attached,
                // The dinner row vanished after the existence check
                Err(RepositoryError::ConstraintViolation { .. }) => {
                    return Err(ServiceError::DinnerNotFound { id: dinner_id });
                }
                Err(e) => return Err(e.into()),
            };

            if !attached {
                return Err(ServiceError::FoodNotFound { id: food_id });
            }

            if let Some(previous) = food.dinner_id {
                crate::info_with_trace!(
                    food_id = food_id,
                    previous_dinner_id = previous,
                    "Food moved between dinners"
                );
            }

            crate::info_with_trace!(dinner_id = dinner_id, food_id = food_id, "Food added to dinner");
            Ok::<_, ServiceError>(())
        })
        .await
    }

    #[instrument(skip(self), fields(dinner_id = dinner_id, food_id = food_id))]
    pub async fn remove_food_from_dinner(
        &self,
        dinner_id: i64,
        food_id: i64,
    ) -> ServiceResult<()> {
        self.traced("remove_food", Some(dinner_id), async {
            let dinner = self.load_dinner(dinner_id).await?;

            if !dinner.contains_food(food_id) {
                return Err(ServiceError::FoodNotInDinner { dinner_id, food_id });
            }

            // Only detaches while the food still points at this dinner
            if !self.foods.unassign_dinner(food_id, dinner_id).await? {
                return Err(ServiceError::FoodNotInDinner { dinner_id, food_id });
            }

            crate::info_with_trace!(dinner_id = dinner_id, food_id = food_id, "Food removed from dinner");
            Ok::<_, ServiceError>(())
        })
        .await
    }
}
