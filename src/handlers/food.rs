use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderName, StatusCode},
    response::Json,
};
use tracing::{error, info, instrument, warn};

use super::errors::{
    json_rejection_to_response, path_rejection_to_response, service_error_to_response, ApiError,
};
use super::AppState;
use crate::models::{CreateFoodRequest, Food, UpdateFoodRequest};

/// List all foods; an empty store answers 200 with `[]`
#[instrument(name = "list_foods", skip(state))]
pub async fn list_foods(State(state): State<AppState>) -> Result<Json<Vec<Food>>, ApiError> {
    match state.food_service.list_foods().await {
        Ok(foods) => {
            info!("Successfully listed {} foods", foods.len());
            Ok(Json(foods))
        }
        Err(err) => {
            error!("Failed to list foods: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "get_food", skip(state, id))]
pub async fn get_food(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Food>, ApiError> {
    let Path(id) = id.map_err(path_rejection_to_response)?;

    match state.food_service.get_food(id).await {
        Ok(food) => Ok(Json(food)),
        Err(err) => {
            warn!(food_id = id, "Failed to get food: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "create_food", skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    payload: Result<Json<CreateFoodRequest>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Food>), ApiError> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;

    match state.food_service.create_food(request).await {
        Ok(food) => {
            crate::info_with_trace!(food_id = food.id, "Food created");
            let location = format!("/api/Food/{}", food.id);
            Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(food)))
        }
        Err(err) => {
            warn!("Failed to create food: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "update_food", skip(state, id, payload))]
pub async fn update_food(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateFoodRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(path_rejection_to_response)?;
    let Json(request) = payload.map_err(json_rejection_to_response)?;

    match state.food_service.update_food(id, request).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!(food_id = id, "Failed to update food: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "delete_food", skip(state, id))]
pub async fn delete_food(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(path_rejection_to_response)?;

    match state.food_service.delete_food(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!(food_id = id, "Failed to delete food: {}", err);
            Err(service_error_to_response(err))
        }
    }
}
