//! Maintenance ticket routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::{PageQuery, double_option};
use crate::{AppState, middleware::AuthUser};
use rentora_core::ticket::{TicketCategory, TicketPatch, TicketPriority, TicketStatus};
use rentora_db::TicketRepository;
use rentora_db::repositories::{CreateTicketInput, TicketFilter};

/// Creates the ticket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create_ticket))
        .route("/tickets", get(list_tickets))
        .route("/tickets/{ticket_id}", get(get_ticket))
        .route("/tickets/{ticket_id}", patch(update_ticket))
        .route("/tickets/{ticket_id}", delete(delete_ticket))
}

/// Request body for creating a ticket.
#[derive(Debug, Deserialize)]
struct CreateTicketRequest {
    building_id: Uuid,
    contract_id: Option<Uuid>,
    title: String,
    description: String,
    priority: Option<TicketPriority>,
    category: Option<TicketCategory>,
}

/// Request body for updating a ticket.
///
/// Tenant callers may only change the description; everything else in
/// their patch is discarded by the write policy before it reaches storage.
#[derive(Debug, Deserialize)]
struct UpdateTicketRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<TicketStatus>,
    priority: Option<TicketPriority>,
    category: Option<TicketCategory>,
    #[serde(default, deserialize_with = "double_option")]
    assigned_to_id: Option<Option<Uuid>>,
    resolved_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing tickets.
#[derive(Debug, Deserialize)]
struct ListTicketsQuery {
    status: Option<TicketStatus>,
    building_id: Option<Uuid>,
    contract_id: Option<Uuid>,
    priority: Option<TicketPriority>,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// POST /tickets - File a ticket.
async fn create_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TicketRepository::new((*state.db).clone());
    let ticket = repo
        .create(
            auth.context(),
            CreateTicketInput {
                building_id: payload.building_id,
                contract_id: payload.contract_id,
                title: payload.title,
                description: payload.description,
                priority: payload.priority,
                category: payload.category,
            },
        )
        .await?;

    info!(ticket_id = %ticket.id, building_id = %ticket.building_id, "Ticket created");
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /tickets - List tickets, newest first.
async fn list_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTicketsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TicketRepository::new((*state.db).clone());
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let tickets = repo
        .list(
            auth.context(),
            TicketFilter {
                status: query.status,
                building_id: query.building_id,
                contract_id: query.contract_id,
                priority: query.priority,
            },
            page.page_request(),
        )
        .await?;
    Ok(Json(tickets))
}

/// GET /tickets/{ticket_id} - Fetch one ticket.
async fn get_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TicketRepository::new((*state.db).clone());
    let ticket = repo.get(auth.context(), ticket_id).await?;
    Ok(Json(ticket))
}

/// PATCH /tickets/{ticket_id} - Update a ticket.
async fn update_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<UpdateTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TicketRepository::new((*state.db).clone());
    let ticket = repo
        .update(
            auth.context(),
            ticket_id,
            TicketPatch {
                title: payload.title,
                description: payload.description,
                status: payload.status,
                priority: payload.priority,
                category: payload.category,
                assigned_to_id: payload.assigned_to_id,
                resolved_at: payload.resolved_at,
            },
        )
        .await?;

    info!(ticket_id = %ticket.id, "Ticket updated");
    Ok(Json(ticket))
}

/// DELETE /tickets/{ticket_id} - Delete a ticket.
async fn delete_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TicketRepository::new((*state.db).clone());
    repo.delete(auth.context(), ticket_id).await?;

    info!(ticket_id = %ticket_id, "Ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}
