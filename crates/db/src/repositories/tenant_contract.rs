//! Tenant-contract link repository.
//!
//! Links carry the tenant's percentage share of the unit. The share-sum
//! bound (at most 100 per contract) is a hard transactional invariant: the
//! contract row is locked `FOR UPDATE` and the existing shares re-read
//! inside the writing transaction, so two concurrent additions serialize
//! and exactly one of a conflicting pair fails.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use rentora_core::context::RequestContext;
use rentora_core::tenancy;
use rentora_shared::error::{AppError, AppResult};

use crate::coordinator::with_context;
use crate::entities::sea_orm_active_enums::UserRole;
use crate::entities::{contracts, tenant_contracts, users};
use crate::error::{is_unique_violation, RepoError};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for linking a tenant to a contract.
#[derive(Debug, Clone)]
pub struct AddTenantInput {
    /// The contract.
    pub contract_id: Uuid,
    /// The tenant user.
    pub tenant_id: Uuid,
    /// Share of the unit in percent, (0, 100].
    pub percentage: Decimal,
    /// Whether this tenant is the primary contact.
    pub is_main_tenant: bool,
}

/// Tenant-contract repository.
#[derive(Debug, Clone)]
pub struct TenantContractRepository {
    db: DatabaseConnection,
}

impl TenantContractRepository {
    /// Creates a new tenant-contract repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Links a tenant to a contract. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// contract or tenant is missing, `Validation` for an out-of-range
    /// share or a non-tenant user, `Conflict` if the share would push the
    /// contract past 100% or the link already exists, or a storage error.
    pub async fn add_tenant(
        &self,
        ctx: &RequestContext,
        input: AddTenantInput,
    ) -> AppResult<tenant_contracts::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if !tenancy::is_valid_share(input.percentage) {
                    return Err::<_, RepoError>(AppError::Validation(
                        "percentage must be in (0, 100]".to_string(),
                    )
                    .into());
                }

                // Lock the contract row so concurrent share additions for
                // the same contract serialize on it.
                let contract = contracts::Entity::find_by_id(input.contract_id)
                    .filter(contracts::Column::OrganizationId.eq(ctx.organization_id))
                    .lock_exclusive()
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("contract", input.contract_id))?;
                if !contract.is_active {
                    return Err(
                        AppError::Conflict("contract is terminated".to_string()).into()
                    );
                }

                let tenant = users::Entity::find_by_id(input.tenant_id)
                    .filter(policy::users_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("user", input.tenant_id))?;
                if tenant.role != UserRole::Tenant {
                    return Err(AppError::Validation(
                        "only tenant users can be linked to contracts".to_string(),
                    )
                    .into());
                }

                // Re-read under the lock: this snapshot cannot go stale
                // before our insert commits.
                let existing: Vec<Decimal> = tenant_contracts::Entity::find()
                    .select_only()
                    .column(tenant_contracts::Column::Percentage)
                    .filter(tenant_contracts::Column::ContractId.eq(contract.id))
                    .into_tuple()
                    .all(txn)
                    .await?;
                if !tenancy::share_fits(&existing, input.percentage) {
                    return Err(AppError::Conflict(format!(
                        "share {}% would push the contract past 100% (current total {}%)",
                        input.percentage,
                        tenancy::share_sum(&existing)
                    ))
                    .into());
                }

                let now = chrono::Utc::now().into();
                let link = tenant_contracts::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    tenant_id: Set(tenant.id),
                    contract_id: Set(contract.id),
                    percentage: Set(input.percentage),
                    is_main_tenant: Set(input.is_main_tenant),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                match link.insert(txn).await {
                    Ok(link) => Ok(link),
                    Err(err) if is_unique_violation(&err) => Err(AppError::Conflict(
                        "tenant is already linked to this contract".to_string(),
                    )
                    .into()),
                    Err(err) => Err(err.into()),
                }
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists the links on one contract visible to the caller.
    ///
    /// Admins see every link; a tenant sees only their own.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list_for_contract(
        &self,
        ctx: &RequestContext,
        contract_id: Uuid,
    ) -> AppResult<Vec<tenant_contracts::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                Ok::<_, RepoError>(
                    tenant_contracts::Entity::find()
                        .filter(policy::tenant_contracts_filter(&ctx))
                        .filter(tenant_contracts::Column::ContractId.eq(contract_id))
                        .order_by_desc(tenant_contracts::Column::Percentage)
                        .all(txn)
                        .await?,
                )
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists the caller's own links (or all links of the organization for
    /// admins).
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<tenant_contracts::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                Ok::<_, RepoError>(
                    tenant_contracts::Entity::find()
                        .filter(policy::tenant_contracts_filter(&ctx))
                        .order_by_desc(tenant_contracts::Column::CreatedAt)
                        .all(txn)
                        .await?,
                )
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Removes a tenant-contract link. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// link is missing, or a storage error.
    pub async fn remove(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let link = tenant_contracts::Entity::find_by_id(id)
                    .filter(policy::tenant_contracts_filter(&ctx))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("tenant contract", id))?;

                tenant_contracts::Entity::delete_by_id(link.id).exec(txn).await?;
                Ok::<_, RepoError>(())
            })
        })
        .await
        .map_err(AppError::from)
    }
}
