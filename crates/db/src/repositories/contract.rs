//! Contract repository.
//!
//! Contracts are the pivot of tenant scoping: what a tenant may see across
//! most entities derives from the contracts they hold. Writes are
//! admin-only. Creation checks unit availability inside the writing
//! transaction; termination is a composite operation that also closes the
//! contract's open tickets and can leave a note document behind.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use rentora_core::context::RequestContext;
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::{PageRequest, PageResponse};

use crate::coordinator::with_context;
use crate::entities::sea_orm_active_enums::TicketStatus;
use crate::entities::{buildings, contracts, documents, tickets};
use crate::error::{is_unique_violation, RepoError};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for creating a contract.
#[derive(Debug, Clone)]
pub struct CreateContractInput {
    /// Building the unit belongs to.
    pub building_id: Uuid,
    /// Contract number, unique per organization.
    pub contract_number: String,
    /// Unit within the building.
    pub unit_number: String,
    /// First day of the tenancy.
    pub start_date: NaiveDate,
    /// Last day, if fixed-term.
    pub end_date: Option<NaiveDate>,
    /// Monthly rent.
    pub rent_amount: Decimal,
}

/// Input for updating a contract. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateContractInput {
    /// New end date; `Some(None)` clears it.
    pub end_date: Option<Option<NaiveDate>>,
    /// New monthly rent.
    pub rent_amount: Option<Decimal>,
}

/// Input for terminating a contract.
#[derive(Debug, Clone)]
pub struct TerminateContractInput {
    /// Effective end date of the tenancy.
    pub end_date: NaiveDate,
    /// Optional termination note, stored as a document on the contract.
    pub note: Option<String>,
}

/// Filter options for listing contracts.
#[derive(Debug, Clone, Default)]
pub struct ContractFilter {
    /// Restrict to one building.
    pub building_id: Option<Uuid>,
    /// Restrict by active flag.
    pub is_active: Option<bool>,
}

/// Contract repository.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    db: DatabaseConnection,
}

impl ContractRepository {
    /// Creates a new contract repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a contract. Admin-only.
    ///
    /// Unit availability (no other active contract on the same building
    /// and unit) is checked inside the writing transaction. A duplicate
    /// contract number surfaces as `Conflict` from the unique index.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// building is missing, `Conflict` if the unit is occupied or the
    /// number is taken, `Validation` for a non-positive rent or an end
    /// date before the start date, or a storage error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateContractInput,
    ) -> AppResult<contracts::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if input.rent_amount <= Decimal::ZERO {
                    return Err::<_, RepoError>(
                        AppError::Validation("rent_amount must be positive".to_string()).into(),
                    );
                }
                if matches!(input.end_date, Some(end) if end < input.start_date) {
                    return Err(AppError::Validation(
                        "end_date must not precede start_date".to_string(),
                    )
                    .into());
                }

                let building = buildings::Entity::find_by_id(input.building_id)
                    .filter(policy::buildings_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("building", input.building_id))?;

                let occupied = contracts::Entity::find()
                    .filter(contracts::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(contracts::Column::BuildingId.eq(building.id))
                    .filter(contracts::Column::UnitNumber.eq(&input.unit_number))
                    .filter(contracts::Column::IsActive.eq(true))
                    .count(txn)
                    .await?;
                if occupied > 0 {
                    return Err(AppError::Conflict(format!(
                        "unit {} already has an active contract",
                        input.unit_number
                    ))
                    .into());
                }

                let now = chrono::Utc::now().into();
                let contract = contracts::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    building_id: Set(building.id),
                    contract_number: Set(input.contract_number.clone()),
                    unit_number: Set(input.unit_number.clone()),
                    start_date: Set(input.start_date),
                    end_date: Set(input.end_date),
                    rent_amount: Set(input.rent_amount),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                match contract.insert(txn).await {
                    Ok(contract) => Ok(contract),
                    Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(format!(
                        "contract number '{}' is already taken",
                        input.contract_number
                    ))
                    .into()),
                    Err(err) => Err(err.into()),
                }
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Fetches one contract visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the contract is out of scope or missing, or a
    /// storage error.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<contracts::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                contracts::Entity::find_by_id(id)
                    .filter(policy::contracts_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("contract", id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists contracts visible to the caller, newest first.
    ///
    /// A tenant with no contract links gets an empty page, not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: ContractFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<contracts::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let mut query =
                    contracts::Entity::find().filter(policy::contracts_filter(&ctx, &holdings));

                if let Some(building_id) = filter.building_id {
                    query = query.filter(contracts::Column::BuildingId.eq(building_id));
                }
                if let Some(is_active) = filter.is_active {
                    query = query.filter(contracts::Column::IsActive.eq(is_active));
                }

                let total = query.clone().count(txn).await?;
                let data = query
                    .order_by_desc(contracts::Column::CreatedAt)
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

    /// Updates a contract. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// contract is missing, `Validation` for a non-positive rent, or a
    /// storage error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateContractInput,
    ) -> AppResult<contracts::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if matches!(input.rent_amount, Some(rent) if rent <= Decimal::ZERO) {
                    return Err::<_, RepoError>(
                        AppError::Validation("rent_amount must be positive".to_string()).into(),
                    );
                }

                let holdings = policy::load_holdings(txn, &ctx).await?;
                let contract = contracts::Entity::find_by_id(id)
                    .filter(policy::contracts_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("contract", id))?;

                let mut active: contracts::ActiveModel = contract.into();
                if let Some(end_date) = input.end_date {
                    active.end_date = Set(end_date);
                }
                if let Some(rent_amount) = input.rent_amount {
                    active.rent_amount = Set(rent_amount);
                }

                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Terminates a contract. Admin-only, composite.
    ///
    /// In one transaction: the contract is deactivated with the given end
    /// date, its open tickets are closed with `resolved_at` stamped, and
    /// an optional termination note is stored as a document on the
    /// contract. Terminating an already inactive contract is a `Conflict`.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// contract is missing, `Conflict` if it is already terminated, or a
    /// storage error.
    pub async fn terminate(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: TerminateContractInput,
    ) -> AppResult<contracts::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let holdings = policy::load_holdings(txn, &ctx).await?;
                let contract = contracts::Entity::find_by_id(id)
                    .filter(policy::contracts_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("contract", id))?;

                if !contract.is_active {
                    return Err::<_, RepoError>(
                        AppError::Conflict("contract is already terminated".to_string()).into(),
                    );
                }

                let mut active: contracts::ActiveModel = contract.into();
                active.is_active = Set(false);
                active.end_date = Set(Some(input.end_date));
                let contract = active.update(txn).await?;

                // Closing must stamp resolved_at; a ticket resolved earlier
                // keeps its first timestamp.
                tickets::Entity::update_many()
                    .col_expr(tickets::Column::Status, TicketStatus::Closed.as_enum())
                    .col_expr(
                        tickets::Column::ResolvedAt,
                        Expr::cust("COALESCE(resolved_at, NOW())"),
                    )
                    .filter(tickets::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(tickets::Column::ContractId.eq(contract.id))
                    .filter(
                        Condition::any()
                            .add(tickets::Column::Status.eq(TicketStatus::Open))
                            .add(tickets::Column::Status.eq(TicketStatus::InProgress))
                            .add(tickets::Column::Status.eq(TicketStatus::WaitingForTenant)),
                    )
                    .exec(txn)
                    .await?;

                if let Some(note) = input.note {
                    let now = chrono::Utc::now().into();
                    let document = documents::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        organization_id: Set(ctx.organization_id),
                        building_id: Set(Some(contract.building_id)),
                        contract_id: Set(Some(contract.id)),
                        ticket_id: Set(None),
                        uploaded_by_id: Set(ctx.user_id),
                        file_name: Set(format!("termination-{}.txt", contract.contract_number)),
                        title: Set(note),
                        is_public: Set(false),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    document.insert(txn).await?;
                }

                Ok(contract)
            })
        })
        .await
        .map_err(AppError::from)
    }
}
