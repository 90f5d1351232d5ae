//! User management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::PageQuery;
use crate::{AppState, middleware::AuthUser};
use rentora_core::Role;
use rentora_db::UserRepository;
use rentora_db::repositories::CreateUserInput;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users", get(list_users))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}", delete(deactivate_user))
}

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    email: String,
    full_name: String,
    role: Role,
}

/// POST /users - Create a user in the caller's organization.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UserRepository::new((*state.db).clone());
    let user = repo
        .create(
            auth.context(),
            CreateUserInput {
                email: payload.email,
                full_name: payload.full_name,
                role: payload.role,
            },
        )
        .await?;

    info!(user_id = %user.id, role = %payload.role, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users - List users, newest first.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UserRepository::new((*state.db).clone());
    let users = repo.list(auth.context(), page.page_request()).await?;
    Ok(Json(users))
}

/// GET /users/{user_id} - Fetch one user.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UserRepository::new((*state.db).clone());
    let user = repo.get(auth.context(), user_id).await?;
    Ok(Json(user))
}

/// DELETE /users/{user_id} - Deactivate a user.
async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = UserRepository::new((*state.db).clone());
    let user = repo.deactivate(auth.context(), user_id).await?;

    info!(user_id = %user.id, "User deactivated");
    Ok(Json(user))
}
