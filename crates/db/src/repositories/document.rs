//! Document repository.
//!
//! Documents carry metadata only; file content lives outside this layer.
//! Tenants may upload against contracts they hold or tickets they can
//! see, and their uploads are never public. Visibility follows the widest
//! policy predicate in the system: public, own upload, held contract, or
//! own ticket.

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
use crate::entities::{buildings, contracts, documents, tickets};
use crate::policy;
use crate::repositories::not_found;

/// Input for creating a document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Building the document concerns, if any. Admin-only.
    pub building_id: Option<Uuid>,
    /// Contract the document is tied to, if any.
    pub contract_id: Option<Uuid>,
    /// Ticket the document is attached to, if any.
    pub ticket_id: Option<Uuid>,
    /// Stored file name.
    pub file_name: String,
    /// Display title.
    pub title: String,
    /// Visible to every tenant of the organization. Admin-only; forced to
    /// false for tenant uploads.
    pub is_public: bool,
}

/// Input for updating a document. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentInput {
    /// New display title.
    pub title: Option<String>,
    /// New visibility. Admin-only; ignored for tenant callers.
    pub is_public: Option<bool>,
}

/// Filter options for listing documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Restrict to one building.
    pub building_id: Option<Uuid>,
    /// Restrict to one contract.
    pub contract_id: Option<Uuid>,
    /// Restrict to one ticket.
    pub ticket_id: Option<Uuid>,
}

/// Document repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a document.
    ///
    /// Every referenced anchor (building, contract, ticket) is re-read
    /// under the caller's own visibility predicate, so a tenant can only
    /// attach to what they could fetch anyway. Tenant uploads must anchor
    /// to a contract or ticket, and are never public.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for out-of-scope anchors, `Validation` for a
    /// tenant upload without an anchor or with a building anchor, or a
    /// storage error.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateDocumentInput,
    ) -> AppResult<documents::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;

                if !ctx.is_admin() {
                    if input.building_id.is_some() {
                        return Err::<_, RepoError>(AppError::Validation(
                            "tenant uploads cannot target a building".to_string(),
                        )
                        .into());
                    }
                    if input.contract_id.is_none() && input.ticket_id.is_none() {
                        return Err(AppError::Validation(
                            "tenant uploads must reference a contract or ticket".to_string(),
                        )
                        .into());
                    }
                }

                if let Some(building_id) = input.building_id {
                    buildings::Entity::find_by_id(building_id)
                        .filter(policy::buildings_filter(&ctx))
                        .one(txn)
                        .await?
                        .ok_or_else(|| not_found("building", building_id))?;
                }
                if let Some(contract_id) = input.contract_id {
                    contracts::Entity::find_by_id(contract_id)
                        .filter(policy::contracts_filter(&ctx, &holdings))
                        .one(txn)
                        .await?
                        .ok_or_else(|| not_found("contract", contract_id))?;
                }
                if let Some(ticket_id) = input.ticket_id {
                    tickets::Entity::find_by_id(ticket_id)
                        .filter(policy::tickets_filter(&ctx, &holdings))
                        .one(txn)
                        .await?
                        .ok_or_else(|| not_found("ticket", ticket_id))?;
                }

                let now = chrono::Utc::now().into();
                let document = documents::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    building_id: Set(input.building_id),
                    contract_id: Set(input.contract_id),
                    ticket_id: Set(input.ticket_id),
                    uploaded_by_id: Set(ctx.user_id),
                    file_name: Set(input.file_name),
                    title: Set(input.title),
                    is_public: Set(ctx.is_admin() && input.is_public),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                Ok(document.insert(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Fetches one document visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document is out of scope or missing, or a
    /// storage error.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<documents::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                documents::Entity::find_by_id(id)
                    .filter(policy::documents_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("document", id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists documents visible to the caller, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: DocumentFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<documents::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let mut query =
                    documents::Entity::find().filter(policy::documents_filter(&ctx, &holdings));

                if let Some(building_id) = filter.building_id {
                    query = query.filter(documents::Column::BuildingId.eq(building_id));
                }
                if let Some(contract_id) = filter.contract_id {
                    query = query.filter(documents::Column::ContractId.eq(contract_id));
                }
                if let Some(ticket_id) = filter.ticket_id {
                    query = query.filter(documents::Column::TicketId.eq(ticket_id));
                }

                let total = query.clone().count(txn).await?;
                let data = query
                    .order_by_desc(documents::Column::CreatedAt)
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

    /// Updates a document's metadata.
    ///
    /// Admins may update any document in scope; a tenant only their own
    /// uploads. The `is_public` flag is admin-only and silently ignored
    /// for tenants.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document is out of scope, missing, or not
    /// the tenant's own upload, or a storage error.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateDocumentInput,
    ) -> AppResult<documents::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let document = documents::Entity::find_by_id(id)
                    .filter(policy::documents_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("document", id))?;

                if !ctx.is_admin() && document.uploaded_by_id != ctx.user_id {
                    return Err::<_, RepoError>(AppError::AccessDenied(format!("document {id}")).into());
                }

                let mut active: documents::ActiveModel = document.into();
                if let Some(title) = input.title {
                    active.title = Set(title);
                }
                if let Some(is_public) = input.is_public {
                    if ctx.is_admin() {
                        active.is_public = Set(is_public);
                    }
                }

                Ok(active.update(txn).await?)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Deletes a document. Admins may delete any document in scope; a
    /// tenant only their own uploads.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the document is out of scope, missing, or not
    /// the tenant's own upload, or a storage error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let document = documents::Entity::find_by_id(id)
                    .filter(policy::documents_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("document", id))?;

                if !ctx.is_admin() && document.uploaded_by_id != ctx.user_id {
                    return Err::<_, RepoError>(AppError::AccessDenied(format!("document {id}")).into());
                }

                documents::Entity::delete_by_id(document.id).exec(txn).await?;
                Ok(())
            })
        })
        .await
        .map_err(AppError::from)
    }
}
