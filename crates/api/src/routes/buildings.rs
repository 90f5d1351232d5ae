//! Building management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::PageQuery;
use crate::{AppState, middleware::AuthUser};
use rentora_db::BuildingRepository;
use rentora_db::repositories::{CreateBuildingInput, UpdateBuildingInput};

/// Creates the building routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/buildings", post(create_building))
        .route("/buildings", get(list_buildings))
        .route("/buildings/{building_id}", get(get_building))
        .route("/buildings/{building_id}", patch(update_building))
        .route("/buildings/{building_id}", delete(delete_building))
}

/// Request body for creating a building.
#[derive(Debug, Deserialize)]
struct CreateBuildingRequest {
    name: String,
    street: String,
    house_number: String,
    postal_code: String,
    city: String,
    total_units: i32,
}

/// Request body for updating a building.
#[derive(Debug, Deserialize)]
struct UpdateBuildingRequest {
    name: Option<String>,
    street: Option<String>,
    house_number: Option<String>,
    postal_code: Option<String>,
    city: Option<String>,
    total_units: Option<i32>,
}

/// POST /buildings - Create a building.
async fn create_building(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBuildingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = BuildingRepository::new((*state.db).clone());
    let building = repo
        .create(
            auth.context(),
            CreateBuildingInput {
                name: payload.name,
                street: payload.street,
                house_number: payload.house_number,
                postal_code: payload.postal_code,
                city: payload.city,
                total_units: payload.total_units,
            },
        )
        .await?;

    info!(building_id = %building.id, "Building created");
    Ok((StatusCode::CREATED, Json(building)))
}

/// GET /buildings - List buildings.
async fn list_buildings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = BuildingRepository::new((*state.db).clone());
    let buildings = repo.list(auth.context(), page.page_request()).await?;
    Ok(Json(buildings))
}

/// GET /buildings/{building_id} - Fetch one building.
async fn get_building(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(building_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = BuildingRepository::new((*state.db).clone());
    let building = repo.get(auth.context(), building_id).await?;
    Ok(Json(building))
}

/// PATCH /buildings/{building_id} - Update a building.
async fn update_building(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(building_id): Path<Uuid>,
    Json(payload): Json<UpdateBuildingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = BuildingRepository::new((*state.db).clone());
    let building = repo
        .update(
            auth.context(),
            building_id,
            UpdateBuildingInput {
                name: payload.name,
                street: payload.street,
                house_number: payload.house_number,
                postal_code: payload.postal_code,
                city: payload.city,
                total_units: payload.total_units,
            },
        )
        .await?;

    info!(building_id = %building.id, "Building updated");
    Ok(Json(building))
}

/// DELETE /buildings/{building_id} - Delete a building and detach its
/// dependents. Refused while active contracts exist.
async fn delete_building(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(building_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = BuildingRepository::new((*state.db).clone());
    repo.delete(auth.context(), building_id).await?;

    info!(building_id = %building_id, "Building deleted");
    Ok(StatusCode::NO_CONTENT)
}
