//! Dashboard aggregation routes.
//!
//! Every figure is computed under the caller's scope, so a tenant's
//! dashboard only ever counts their own slice of the data.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};
use rentora_core::consumption::ConsumptionType;
use rentora_db::StatsRepository;
use rentora_db::repositories::ConsumptionQuery;
use rentora_shared::types::BillingPeriod;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/tickets", get(ticket_summary))
        .route("/dashboard/consumption", get(consumption_by_period))
        .route("/dashboard/occupancy", get(occupancy))
}

/// Query parameters for the consumption aggregate.
#[derive(Debug, Deserialize)]
struct ConsumptionStatsQuery {
    contract_id: Option<Uuid>,
    consumption_type: Option<ConsumptionType>,
    from: Option<BillingPeriod>,
    to: Option<BillingPeriod>,
}

/// GET /dashboard/tickets - Ticket counts by status.
async fn ticket_summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = StatsRepository::new((*state.db).clone());
    let summary = repo.ticket_summary(auth.context()).await?;
    Ok(Json(summary))
}

/// GET /dashboard/consumption - Totals per billing month and type.
async fn consumption_by_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ConsumptionStatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = StatsRepository::new((*state.db).clone());
    let totals = repo
        .consumption_by_period(
            auth.context(),
            ConsumptionQuery {
                contract_id: query.contract_id,
                consumption_type: query.consumption_type,
                from: query.from,
                to: query.to,
            },
        )
        .await?;
    Ok(Json(totals))
}

/// GET /dashboard/occupancy - Unit occupancy across visible buildings.
async fn occupancy(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = StatsRepository::new((*state.db).clone());
    let summary = repo.occupancy(auth.context()).await?;
    Ok(Json(summary))
}
