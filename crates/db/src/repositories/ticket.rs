//! Ticket repository.
//!
//! The ticket flow is the one place tenants write. Creation is open to
//! both roles (tenants only against their own contracts); updates pass
//! through the field-level allow-list and the status state machine; reads
//! apply the created-by-or-held-contract predicate.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use rentora_core::context::RequestContext;
use rentora_core::policy::write::restrict_ticket_patch;
use rentora_core::ticket::{
    resolution_timestamp, TicketCategory, TicketPatch, TicketPriority, TicketStatus,
};
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::{PageRequest, PageResponse};

use crate::error::RepoError;
use crate::coordinator::with_context;
use crate::entities::sea_orm_active_enums::TicketStatus as DbTicketStatus;
use crate::entities::{buildings, contracts, documents, tickets};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for creating a ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketInput {
    /// Building the ticket concerns.
    pub building_id: Uuid,
    /// Contract the ticket is tied to. Required for tenant callers, who
    /// may only reference a contract they hold.
    pub contract_id: Option<Uuid>,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Priority; defaults to medium.
    pub priority: Option<TicketPriority>,
    /// Category; defaults to general.
    pub category: Option<TicketCategory>,
}

/// Filter options for listing tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Restrict to one status.
    pub status: Option<TicketStatus>,
    /// Restrict to one building.
    pub building_id: Option<Uuid>,
    /// Restrict to one contract.
    pub contract_id: Option<Uuid>,
    /// Restrict to one priority.
    pub priority: Option<TicketPriority>,
}

/// Ticket repository.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    db: DatabaseConnection,
}

impl TicketRepository {
    /// Creates a new ticket repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a ticket.
    ///
    /// Tenant callers must tie the ticket to a contract they hold; the
    /// building is taken from that contract. Admins may file tickets
    /// against any building of the organization, with or without a
    /// contract.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the referenced building or contract is out of
    /// scope or missing, `Validation` if a tenant omits the contract, or a
    /// storage error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateTicketInput,
    ) -> AppResult<tickets::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;

                let (building_id, contract_id) = if ctx.is_admin() {
                    if let Some(contract_id) = input.contract_id {
                        let contract = contracts::Entity::find_by_id(contract_id)
                            .filter(policy::contracts_filter(&ctx, &holdings))
                            .one(txn)
                            .await?
                            .ok_or_else(|| not_found("contract", contract_id))?;
                        (contract.building_id, Some(contract.id))
                    } else {
                        let building = buildings::Entity::find_by_id(input.building_id)
                            .filter(policy::buildings_filter(&ctx))
                            .one(txn)
                            .await?
                            .ok_or_else(|| not_found("building", input.building_id))?;
                        (building.id, None)
                    }
                } else {
                    let contract_id = input.contract_id.ok_or_else(|| {
                        AppError::Validation(
                            "tenant tickets must reference a contract".to_string(),
                        )
                    })?;
                    let contract = contracts::Entity::find_by_id(contract_id)
                        .filter(policy::contracts_filter(&ctx, &holdings))
                        .one(txn)
                        .await?
                        .ok_or_else(|| not_found("contract", contract_id))?;
                    (contract.building_id, Some(contract.id))
                };

                let now = chrono::Utc::now().into();
                let ticket = tickets::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    building_id: Set(building_id),
                    contract_id: Set(contract_id),
                    created_by_id: Set(ctx.user_id),
                    assigned_to_id: Set(None),
                    title: Set(input.title),
                    description: Set(input.description),
                    status: Set(DbTicketStatus::Open),
                    priority: Set(input.priority.unwrap_or_default().into()),
                    category: Set(input.category.unwrap_or_default().into()),
                    resolved_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                Ok::<_, RepoError>(ticket.insert(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Fetches one ticket visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ticket is out of scope or missing, or a
    /// storage error.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<tickets::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                tickets::Entity::find_by_id(id)
                    .filter(policy::tickets_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("ticket", id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists tickets visible to the caller, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: TicketFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<tickets::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let mut query =
                    tickets::Entity::find().filter(policy::tickets_filter(&ctx, &holdings));

                if let Some(status) = filter.status {
                    query = query.filter(tickets::Column::Status.eq(DbTicketStatus::from(status)));
                }
                if let Some(building_id) = filter.building_id {
                    query = query.filter(tickets::Column::BuildingId.eq(building_id));
                }
                if let Some(contract_id) = filter.contract_id {
                    query = query.filter(tickets::Column::ContractId.eq(contract_id));
                }
                if let Some(priority) = filter.priority {
                    query = query.filter(
                        tickets::Column::Priority
                            .eq(crate::entities::sea_orm_active_enums::TicketPriority::from(
                                priority,
                            )),
                    );
                }

                let total = query.clone().count(txn).await?;
                let data = query
                    .order_by_desc(tickets::Column::CreatedAt)
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

    /// Applies a partial update to a ticket.
    ///
    /// The patch first passes the role allow-list (tenants keep only
    /// `description`; everything else is silently dropped), then the
    /// status state machine. A patch that ends up empty returns the
    /// current row unchanged. Settling a settled ticket again keeps the
    /// first resolution timestamp; reopening clears it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the ticket is out of scope or missing,
    /// `Validation` for an invalid status transition, or a storage error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        patch: TicketPatch,
    ) -> AppResult<tickets::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let ticket = tickets::Entity::find_by_id(id)
                    .filter(policy::tickets_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("ticket", id))?;

                let patch = restrict_ticket_patch(ctx.role, patch);
                if patch.is_empty() {
                    return Ok::<_, RepoError>(ticket);
                }

                let current: TicketStatus = ticket.status.into();
                let next = patch.status.unwrap_or(current);
                if !current.can_transition_to(next) {
                    return Err(AppError::Validation(format!(
                        "cannot move ticket from {current} to {next}"
                    ))
                    .into());
                }

                let existing_resolved_at = ticket.resolved_at.map(Into::into);
                let resolved_at =
                    resolution_timestamp(current, next, existing_resolved_at, patch.resolved_at, chrono::Utc::now());

                let mut active: tickets::ActiveModel = ticket.into();
                if let Some(title) = patch.title {
                    active.title = Set(title);
                }
                if let Some(description) = patch.description {
                    active.description = Set(description);
                }
                if patch.status.is_some() {
                    active.status = Set(next.into());
                    active.resolved_at = Set(resolved_at.map(Into::into));
                }
                if let Some(priority) = patch.priority {
                    active.priority = Set(priority.into());
                }
                if let Some(category) = patch.category {
                    active.category = Set(category.into());
                }
                if let Some(assigned_to_id) = patch.assigned_to_id {
                    active.assigned_to_id = Set(assigned_to_id);
                }

                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Deletes a ticket. Admin-only. Attached documents are detached, not
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// ticket is missing, or a storage error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let holdings = policy::load_holdings(txn, &ctx).await?;
                let ticket = tickets::Entity::find_by_id(id)
                    .filter(policy::tickets_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("ticket", id))?;

                documents::Entity::update_many()
                    .col_expr(documents::Column::TicketId, Expr::value(None::<Uuid>))
                    .filter(documents::Column::OrganizationId.eq(ctx.organization_id))
                    .filter(documents::Column::TicketId.eq(ticket.id))
                    .exec(txn)
                    .await?;

                tickets::Entity::delete_by_id(ticket.id).exec(txn).await?;
                Ok::<_, RepoError>(())
            })
        })
        .await
        .map_err(AppError::from)
    }
}
