//! Organization routes.
//!
//! Every authenticated route acts on the caller's own organization; there
//! is no cross-organization addressing, so the resource is singular.
//! Creation is the unauthenticated provisioning entry point.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::routes::double_option;
use crate::{AppState, middleware::AuthUser};
use rentora_db::OrganizationRepository;
use rentora_db::repositories::{CreateOrganizationInput, UpdateOrganizationInput};

/// Creates the public organization routes (no auth).
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/organizations", post(create_organization))
}

/// Creates the authenticated organization routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organization", get(get_organization))
        .route("/organization", axum::routing::patch(update_organization))
        .route("/organization", delete(deactivate_organization))
}

/// Request body for creating an organization.
#[derive(Debug, Deserialize)]
struct CreateOrganizationRequest {
    name: String,
    slug: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
}

/// Request body for updating an organization.
#[derive(Debug, Deserialize)]
struct UpdateOrganizationRequest {
    name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    contact_email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    contact_phone: Option<Option<String>>,
}

/// POST /organizations - Provision a new organization.
async fn create_organization(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = OrganizationRepository::new((*state.db).clone());
    let org = repo
        .create(CreateOrganizationInput {
            name: payload.name,
            slug: payload.slug,
            contact_email: payload.contact_email,
            contact_phone: payload.contact_phone,
        })
        .await?;

    info!(org_id = %org.id, slug = %org.slug, "Organization created");
    Ok((StatusCode::CREATED, Json(org)))
}

/// GET /organization - The caller's organization.
async fn get_organization(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = OrganizationRepository::new((*state.db).clone());
    let org = repo.get(auth.context()).await?;
    Ok(Json(org))
}

/// PATCH /organization - Update the caller's organization.
async fn update_organization(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = OrganizationRepository::new((*state.db).clone());
    let org = repo
        .update(
            auth.context(),
            UpdateOrganizationInput {
                name: payload.name,
                contact_email: payload.contact_email,
                contact_phone: payload.contact_phone,
            },
        )
        .await?;

    info!(org_id = %org.id, "Organization updated");
    Ok(Json(org))
}

/// DELETE /organization - Deactivate the caller's organization.
async fn deactivate_organization(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = OrganizationRepository::new((*state.db).clone());
    let org = repo.deactivate(auth.context()).await?;

    info!(org_id = %org.id, "Organization deactivated");
    Ok(Json(org))
}
