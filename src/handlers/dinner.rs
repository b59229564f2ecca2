use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderName, StatusCode},
    response::Json,
};
use tracing::{info, instrument, warn};

use super::errors::{
    json_rejection_to_response, path_rejection_to_response, service_error_to_response, ApiError,
};
use super::AppState;
use crate::models::{CreateDinnerRequest, Dinner, UpdateDinnerRequest};

/// List every dinner with its foods; 404 when there are none
#[instrument(name = "list_dinners", skip(state))]
pub async fn list_dinners(State(state): State<AppState>) -> Result<Json<Vec<Dinner>>, ApiError> {
    match state.dinner_service.list_dinners().await {
        Ok(dinners) => {
            info!("Successfully listed {} dinners", dinners.len());
            Ok(Json(dinners))
        }
        Err(err) => {
            warn!("Failed to list dinners: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "create_dinner", skip(state, payload))]
pub async fn create_dinner(
    State(state): State<AppState>,
    payload: Result<Json<CreateDinnerRequest>, JsonRejection>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<Dinner>), ApiError> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;

    match state.dinner_service.create_dinner(request).await {
        Ok(dinner) => {
            crate::info_with_trace!(dinner_id = dinner.id, "Dinner created");
            let location = format!("/Dinner/{}", dinner.id);
            Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(dinner)))
        }
        Err(err) => {
            warn!("Failed to create dinner: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "get_dinner", skip(state, id))]
pub async fn get_dinner(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Dinner>, ApiError> {
    let Path(id) = id.map_err(path_rejection_to_response)?;

    state
        .dinner_service
        .get_dinner(id)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "update_dinner", skip(state, id, payload))]
pub async fn update_dinner(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateDinnerRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(path_rejection_to_response)?;
    let Json(request) = payload.map_err(json_rejection_to_response)?;

    match state.dinner_service.update_dinner(id, request).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!(dinner_id = id, "Failed to update dinner: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "delete_dinner", skip(state, id))]
pub async fn delete_dinner(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(path_rejection_to_response)?;

    match state.dinner_service.delete_dinner(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!(dinner_id = id, "Failed to delete dinner: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "add_food_to_dinner", skip(state, ids))]
pub async fn add_food_to_dinner(
    State(state): State<AppState>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((dinner_id, food_id)) = ids.map_err(path_rejection_to_response)?;

    match state
        .dinner_service
        .add_food_to_dinner(dinner_id, food_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!(dinner_id, food_id, "Failed to add food to dinner: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "remove_food_from_dinner", skip(state, ids))]
pub async fn remove_food_from_dinner(
    State(state): State<AppState>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path((dinner_id, food_id)) = ids.map_err(path_rejection_to_response)?;

    match state
        .dinner_service
        .remove_food_from_dinner(dinner_id, food_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            warn!(dinner_id, food_id, "Failed to remove food from dinner: {}", err);
            Err(service_error_to_response(err))
        }
    }
}
