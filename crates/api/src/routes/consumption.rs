//! Consumption record routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::PageQuery;
use crate::{AppState, middleware::AuthUser};
use rentora_core::consumption::ConsumptionType;
use rentora_db::ConsumptionRepository;
use rentora_db::repositories::{ConsumptionFilter, RecordConsumptionInput};
use rentora_shared::types::BillingPeriod;

/// Creates the consumption routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/consumption", post(record_consumption))
        .route("/consumption", get(list_consumption))
        .route("/consumption/{record_id}", get(get_consumption))
        .route("/consumption/{record_id}", delete(delete_consumption))
}

/// Request body for recording a reading.
#[derive(Debug, Deserialize)]
struct RecordConsumptionRequest {
    contract_id: Uuid,
    consumption_type: ConsumptionType,
    period: BillingPeriod,
    reading: Decimal,
    cost: Decimal,
}

/// Query parameters for listing consumption records.
#[derive(Debug, Deserialize)]
struct ListConsumptionQuery {
    contract_id: Option<Uuid>,
    consumption_type: Option<ConsumptionType>,
    period: Option<BillingPeriod>,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// POST /consumption - Record a reading.
///
/// Writing the same (contract, type, period) key again replaces the
/// stored reading, so a retried request cannot create a duplicate.
async fn record_consumption(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RecordConsumptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ConsumptionRepository::new((*state.db).clone());
    let record = repo
        .record(
            auth.context(),
            RecordConsumptionInput {
                contract_id: payload.contract_id,
                consumption_type: payload.consumption_type,
                period: payload.period,
                reading: payload.reading,
                cost: payload.cost,
            },
        )
        .await?;

    info!(
        record_id = %record.id,
        contract_id = %record.contract_id,
        period = %record.period,
        "Consumption recorded"
    );
    Ok(Json(record))
}

/// GET /consumption - List readings, newest period first.
async fn list_consumption(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListConsumptionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ConsumptionRepository::new((*state.db).clone());
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let records = repo
        .list(
            auth.context(),
            ConsumptionFilter {
                contract_id: query.contract_id,
                consumption_type: query.consumption_type,
                period: query.period,
            },
            page.page_request(),
        )
        .await?;
    Ok(Json(records))
}

/// GET /consumption/{record_id} - Fetch one reading.
async fn get_consumption(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(record_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ConsumptionRepository::new((*state.db).clone());
    let record = repo.get(auth.context(), record_id).await?;
    Ok(Json(record))
}

/// DELETE /consumption/{record_id} - Delete a reading.
async fn delete_consumption(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(record_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ConsumptionRepository::new((*state.db).clone());
    repo.delete(auth.context(), record_id).await?;

    info!(record_id = %record_id, "Consumption record deleted");
    Ok(axum::http::StatusCode::NO_CONTENT)
}
