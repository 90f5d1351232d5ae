//! Building repository.
//!
//! Buildings are visible organization-wide; all writes are admin-only.
//! Deletion is a composite operation: it is refused while active contracts
//! exist, and otherwise detaches documents and removes the building's
//! ticket and contract history in the same transaction.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use rentora_core::context::RequestContext;
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::{PageRequest, PageResponse};

use crate::error::RepoError;
use crate::coordinator::with_context;
use crate::entities::{
    buildings, consumption_records, contracts, documents, invitation_tokens, tenant_contracts,
    tickets,
};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for creating a building.
#[derive(Debug, Clone)]
pub struct CreateBuildingInput {
    /// Display name.
    pub name: String,
    /// Street name.
    pub street: String,
    /// House number.
    pub house_number: String,
    /// Postal code.
    pub postal_code: String,
    /// City.
    pub city: String,
    /// Number of rentable units.
    pub total_units: i32,
}

/// Input for updating a building. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateBuildingInput {
    /// New display name.
    pub name: Option<String>,
    /// New street name.
    pub street: Option<String>,
    /// New house number.
    pub house_number: Option<String>,
    /// New postal code.
    pub postal_code: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New unit count.
    pub total_units: Option<i32>,
}

/// Building repository.
#[derive(Debug, Clone)]
pub struct BuildingRepository {
    db: DatabaseConnection,
}

impl BuildingRepository {
    /// Creates a new building repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a building. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `Validation` for a
    /// non-positive unit count, or a storage error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateBuildingInput,
    ) -> AppResult<buildings::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if input.total_units < 1 {
                    return Err::<_, RepoError>(AppError::Validation(
                        "total_units must be at least 1".to_string(),
                    )
                    .into());
                }

                let now = chrono::Utc::now().into();
                let building = buildings::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    name: Set(input.name),
                    street: Set(input.street),
                    house_number: Set(input.house_number),
                    postal_code: Set(input.postal_code),
                    city: Set(input.city),
                    total_units: Set(input.total_units),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                Ok(building.insert(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Fetches one building.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the building is out of scope or missing, or a
    /// storage error.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<buildings::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                buildings::Entity::find_by_id(id)
                    .filter(policy::buildings_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("building", id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists buildings, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<buildings::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let query = buildings::Entity::find().filter(policy::buildings_filter(&ctx));

                let total = query.clone().count(txn).await?;
                let data = query
                    .order_by_desc(buildings::Column::CreatedAt)
                    .offset(page.offset())
                    .limit(page.limit())
                    .all(txn)
                    .await?;

                Ok::<_, RepoError>(PageResponse::new(data, &page, total))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Updates a building. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// building is missing, `Validation` for a non-positive unit count, or
    /// a storage error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateBuildingInput,
    ) -> AppResult<buildings::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if matches!(input.total_units, Some(n) if n < 1) {
                    return Err::<_, RepoError>(AppError::Validation(
                        "total_units must be at least 1".to_string(),
                    )
                    .into());
                }

                let building = buildings::Entity::find_by_id(id)
                    .filter(policy::buildings_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("building", id))?;

                let mut active: buildings::ActiveModel = building.into();
                if let Some(name) = input.name {
                    active.name = Set(name);
                }
                if let Some(street) = input.street {
                    active.street = Set(street);
                }
                if let Some(house_number) = input.house_number {
                    active.house_number = Set(house_number);
                }
                if let Some(postal_code) = input.postal_code {
                    active.postal_code = Set(postal_code);
                }
                if let Some(city) = input.city {
                    active.city = Set(city);
                }
                if let Some(total_units) = input.total_units {
                    active.total_units = Set(total_units);
                }

                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Deletes a building and its history. Admin-only, composite.
    ///
    /// Refused while active contracts reference the building. Otherwise,
    /// in one transaction: documents are detached from the building and
    /// from its tickets and contracts, then the tickets, tenant links,
    /// consumption records, invitations, and remaining (inactive)
    /// contracts are deleted before the building row itself. Tickets and
    /// contracts reference the building with no cascade, so their rows
    /// cannot outlive it.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// building is missing, `Conflict` while active contracts exist, or a
    /// storage error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let building = buildings::Entity::find_by_id(id)
                    .filter(policy::buildings_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("building", id))?;

                let active_contracts = contracts::Entity::find()
                    .filter(contracts::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(contracts::Column::BuildingId.eq(building.id))
                    .filter(contracts::Column::IsActive.eq(true))
                    .count(txn)
                    .await?;
                if active_contracts > 0 {
                    return Err::<_, RepoError>(AppError::Conflict(format!(
                        "building has {active_contracts} active contract(s)"
                    ))
                    .into());
                }

                let contract_ids: Vec<Uuid> = contracts::Entity::find()
                    .filter(contracts::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(contracts::Column::BuildingId.eq(building.id))
                    .select_only()
                    .column(contracts::Column::Id)
                    .into_tuple()
                    .all(txn)
                    .await?;
                let ticket_ids: Vec<Uuid> = tickets::Entity::find()
                    .filter(tickets::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(tickets::Column::BuildingId.eq(building.id))
                    .select_only()
                    .column(tickets::Column::Id)
                    .into_tuple()
                    .all(txn)
                    .await?;

                documents::Entity::update_many()
                    .col_expr(documents::Column::BuildingId, Expr::value(None::<Uuid>))
                    .filter(documents::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(documents::Column::BuildingId.eq(building.id))
                    .exec(txn)
                    .await?;

                if !ticket_ids.is_empty() {
                    documents::Entity::update_many()
                        .col_expr(documents::Column::TicketId, Expr::value(None::<Uuid>))
                        .filter(documents::Column::OrganizationId.eq(ctx.organization_id))
                        .filter(documents::Column::TicketId.is_in(ticket_ids.clone()))
                        .exec(txn)
                        .await?;
                    tickets::Entity::delete_many()
                        .filter(tickets::Column::Id.is_in(ticket_ids))
                        .exec(txn)
                        .await?;
                }

                if !contract_ids.is_empty() {
                    documents::Entity::update_many()
                        .col_expr(documents::Column::ContractId, Expr::value(None::<Uuid>))
                        .filter(documents::Column::OrganizationId.eq(ctx.organization_id))
                        .filter(documents::Column::ContractId.is_in(contract_ids.clone()))
                        .exec(txn)
                        .await?;
                    invitation_tokens::Entity::delete_many()
                        .filter(invitation_tokens::Column::ContractId.is_in(contract_ids.clone()))
                        .exec(txn)
                        .await?;
                    consumption_records::Entity::delete_many()
                        .filter(consumption_records::Column::ContractId.is_in(contract_ids.clone()))
                        .exec(txn)
                        .await?;
                    tenant_contracts::Entity::delete_many()
                        .filter(tenant_contracts::Column::ContractId.is_in(contract_ids.clone()))
                        .exec(txn)
                        .await?;
                    contracts::Entity::delete_many()
                        .filter(contracts::Column::Id.is_in(contract_ids))
                        .exec(txn)
                        .await?;
                }

                buildings::Entity::delete_by_id(building.id).exec(txn).await?;
                Ok(())
            })
        })
        .await
        .map_err(AppError::from)
    }
}
