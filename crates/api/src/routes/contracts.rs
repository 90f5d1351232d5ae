//! Contract and tenant-link routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::{PageQuery, double_option};
use crate::{AppState, middleware::AuthUser};
use rentora_db::repositories::{
    AddTenantInput, ContractFilter, CreateContractInput, TerminateContractInput,
    UpdateContractInput,
};
use rentora_db::{ContractRepository, TenantContractRepository};

/// Creates the contract routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contracts", post(create_contract))
        .route("/contracts", get(list_contracts))
        .route("/contracts/{contract_id}", get(get_contract))
        .route("/contracts/{contract_id}", patch(update_contract))
        .route("/contracts/{contract_id}/terminate", post(terminate_contract))
        .route("/contracts/{contract_id}/tenants", get(list_contract_tenants))
        .route("/contracts/{contract_id}/tenants", post(add_tenant))
        .route("/tenant-contracts", get(list_tenant_contracts))
        .route("/tenant-contracts/{link_id}", delete(remove_tenant))
}

/// Request body for creating a contract.
#[derive(Debug, Deserialize)]
struct CreateContractRequest {
    building_id: Uuid,
    contract_number: String,
    unit_number: String,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    rent_amount: Decimal,
}

/// Request body for updating a contract.
#[derive(Debug, Deserialize)]
struct UpdateContractRequest {
    #[serde(default, deserialize_with = "double_option")]
    end_date: Option<Option<NaiveDate>>,
    rent_amount: Option<Decimal>,
}

/// Request body for terminating a contract.
#[derive(Debug, Deserialize)]
struct TerminateContractRequest {
    end_date: NaiveDate,
    note: Option<String>,
}

/// Request body for linking a tenant to a contract.
#[derive(Debug, Deserialize)]
struct AddTenantRequest {
    tenant_id: Uuid,
    percentage: Decimal,
    #[serde(default)]
    is_main_tenant: bool,
}

/// Query parameters for listing contracts.
#[derive(Debug, Deserialize)]
struct ListContractsQuery {
    building_id: Option<Uuid>,
    is_active: Option<bool>,
    page: Option<u32>,
    per_page: Option<u32>,
}

/// POST /contracts - Create a contract.
async fn create_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ContractRepository::new((*state.db).clone());
    let contract = repo
        .create(
            auth.context(),
            CreateContractInput {
                building_id: payload.building_id,
                contract_number: payload.contract_number,
                unit_number: payload.unit_number,
                start_date: payload.start_date,
                end_date: payload.end_date,
                rent_amount: payload.rent_amount,
            },
        )
        .await?;

    info!(
        contract_id = %contract.id,
        building_id = %contract.building_id,
        "Contract created"
    );
    Ok((StatusCode::CREATED, Json(contract)))
}

/// GET /contracts - List contracts.
async fn list_contracts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListContractsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ContractRepository::new((*state.db).clone());
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let contracts = repo
        .list(
            auth.context(),
            ContractFilter {
                building_id: query.building_id,
                is_active: query.is_active,
            },
            page.page_request(),
        )
        .await?;
    Ok(Json(contracts))
}

/// GET /contracts/{contract_id} - Fetch one contract.
async fn get_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ContractRepository::new((*state.db).clone());
    let contract = repo.get(auth.context(), contract_id).await?;
    Ok(Json(contract))
}

/// PATCH /contracts/{contract_id} - Update a contract.
async fn update_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<UpdateContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ContractRepository::new((*state.db).clone());
    let contract = repo
        .update(
            auth.context(),
            contract_id,
            UpdateContractInput {
                end_date: payload.end_date,
                rent_amount: payload.rent_amount,
            },
        )
        .await?;

    info!(contract_id = %contract.id, "Contract updated");
    Ok(Json(contract))
}

/// POST /contracts/{contract_id}/terminate - End a tenancy.
async fn terminate_contract(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<TerminateContractRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ContractRepository::new((*state.db).clone());
    let contract = repo
        .terminate(
            auth.context(),
            contract_id,
            TerminateContractInput {
                end_date: payload.end_date,
                note: payload.note,
            },
        )
        .await?;

    info!(contract_id = %contract.id, "Contract terminated");
    Ok(Json(contract))
}

/// GET /contracts/{contract_id}/tenants - Tenant links on a contract.
async fn list_contract_tenants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TenantContractRepository::new((*state.db).clone());
    let links = repo.list_for_contract(auth.context(), contract_id).await?;
    Ok(Json(links))
}

/// POST /contracts/{contract_id}/tenants - Link a tenant to a contract.
async fn add_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<AddTenantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TenantContractRepository::new((*state.db).clone());
    let link = repo
        .add_tenant(
            auth.context(),
            AddTenantInput {
                contract_id,
                tenant_id: payload.tenant_id,
                percentage: payload.percentage,
                is_main_tenant: payload.is_main_tenant,
            },
        )
        .await?;

    info!(
        contract_id = %contract_id,
        tenant_id = %link.tenant_id,
        "Tenant linked to contract"
    );
    Ok((StatusCode::CREATED, Json(link)))
}

/// GET /tenant-contracts - All tenant links visible to the caller.
async fn list_tenant_contracts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TenantContractRepository::new((*state.db).clone());
    let links = repo.list(auth.context()).await?;
    Ok(Json(links))
}

/// DELETE /tenant-contracts/{link_id} - Remove a tenant link.
async fn remove_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(link_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = TenantContractRepository::new((*state.db).clone());
    repo.remove(auth.context(), link_id).await?;

    info!(link_id = %link_id, "Tenant link removed");
    Ok(StatusCode::NO_CONTENT)
}
