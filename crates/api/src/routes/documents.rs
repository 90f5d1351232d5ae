//! Document metadata routes.

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
use rentora_db::DocumentRepository;
use rentora_db::repositories::{CreateDocumentInput, DocumentFilter, UpdateDocumentInput};

/// Creates the document routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/documents", post(create_document))
        .route("/documents", get(list_documents))
        .route("/documents/{document_id}", get(get_document))
        .route("/documents/{document_id}", patch(update_document))
        .route("/documents/{document_id}", delete(delete_document))
}

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
struct CreateDocumentRequest {
    building_id: Option<Uuid>,
    contract_id: Option<Uuid>,
    ticket_id: Option<Uuid>,
    file_name: String,
    title: String,
    #[serde(default)]
    is_public: bool,
}

/// Request body for updating a document.
#[derive(Debug, Deserialize)]
struct UpdateDocumentRequest {
    title: Option<String>,
    is_public: Option<bool>,
}

/// Query parameters for listing documents.
#[derive(Debug, Deserialize)]
struct ListDocumentsQuery {
    building_id: Option<Uuid>,
    contract_id: Option<Uuid>,
    ticket_id: Option<Uuid>,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// POST /documents - Create a document record.
async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo
        .create(
            auth.context(),
            CreateDocumentInput {
                building_id: payload.building_id,
                contract_id: payload.contract_id,
                ticket_id: payload.ticket_id,
                file_name: payload.file_name,
                title: payload.title,
                is_public: payload.is_public,
            },
        )
        .await?;

    info!(document_id = %document.id, "Document created");
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /documents - List documents.
async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let documents = repo
        .list(
            auth.context(),
            DocumentFilter {
                building_id: query.building_id,
                contract_id: query.contract_id,
                ticket_id: query.ticket_id,
            },
            page.page_request(),
        )
        .await?;
    Ok(Json(documents))
}

/// GET /documents/{document_id} - Fetch one document.
async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo.get(auth.context(), document_id).await?;
    Ok(Json(document))
}

/// PATCH /documents/{document_id} - Update a document.
async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    let document = repo
        .update(
            auth.context(),
            document_id,
            UpdateDocumentInput {
                title: payload.title,
                is_public: payload.is_public,
            },
        )
        .await?;

    info!(document_id = %document.id, "Document updated");
    Ok(Json(document))
}

/// DELETE /documents/{document_id} - Delete a document record.
async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DocumentRepository::new((*state.db).clone());
    repo.delete(auth.context(), document_id).await?;

    info!(document_id = %document_id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
