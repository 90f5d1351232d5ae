//! Consumption record repository.
//!
//! Records are keyed by `(contract, consumption type, period)`. Recording
//! is an upsert on that natural key, which doubles as the safe-retry path:
//! replaying the same submission overwrites the reading instead of
//! duplicating the row.

use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use rentora_core::consumption::ConsumptionType;
use rentora_core::context::RequestContext;
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::{BillingPeriod, PageRequest, PageResponse};

use crate::error::RepoError;
use crate::coordinator::with_context;
use crate::entities::sea_orm_active_enums::ConsumptionType as DbConsumptionType;
use crate::entities::{consumption_records, contracts};
use crate::policy;
use crate::repositories::{not_found, require_admin};

/// Input for recording a consumption reading.
#[derive(Debug, Clone)]
pub struct RecordConsumptionInput {
    /// Contract the reading belongs to.
    pub contract_id: Uuid,
    /// What was measured.
    pub consumption_type: ConsumptionType,
    /// Billing month.
    pub period: BillingPeriod,
    /// Meter reading.
    pub reading: Decimal,
    /// Cost for the period.
    pub cost: Decimal,
}

/// Filter options for listing consumption records.
#[derive(Debug, Clone, Default)]
pub struct ConsumptionFilter {
    /// Restrict to one contract.
    pub contract_id: Option<Uuid>,
    /// Restrict to one consumption type.
    pub consumption_type: Option<ConsumptionType>,
    /// Restrict to one billing month.
    pub period: Option<BillingPeriod>,
}

/// Consumption record repository.
#[derive(Debug, Clone)]
pub struct ConsumptionRepository {
    db: DatabaseConnection,
}

impl ConsumptionRepository {
    /// Creates a new consumption repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a reading. Admin-only.
    ///
    /// Upserts on the natural key: a second submission for the same
    /// contract, type, and period overwrites the reading and cost. This
    /// makes retrying a failed submission safe.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// contract is out of scope or missing, `Validation` for a negative
    /// reading or cost, or a storage error.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        input: RecordConsumptionInput,
    ) -> AppResult<consumption_records::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;
                if input.reading < Decimal::ZERO || input.cost < Decimal::ZERO {
                    return Err::<_, RepoError>(AppError::Validation(
                        "reading and cost must be non-negative".to_string(),
                    )
                    .into());
                }

                let holdings = policy::load_holdings(txn, &ctx).await?;
                let contract = contracts::Entity::find_by_id(input.contract_id)
                    .filter(policy::contracts_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("contract", input.contract_id))?;

                let now = chrono::Utc::now().into();
                let record = consumption_records::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    organization_id: Set(ctx.organization_id),
                    contract_id: Set(contract.id),
                    consumption_type: Set(input.consumption_type.into()),
                    period: Set(input.period.to_string()),
                    reading: Set(input.reading),
                    cost: Set(input.cost),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                let model = consumption_records::Entity::insert(record)
                    .on_conflict(
                        OnConflict::columns([
                            consumption_records::Column::ContractId,
                            consumption_records::Column::ConsumptionType,
                            consumption_records::Column::Period,
                        ])
                        .update_columns([
                            consumption_records::Column::Reading,
                            consumption_records::Column::Cost,
                            consumption_records::Column::UpdatedAt,
                        ])
                        .to_owned(),
                    )
                    .exec_with_returning(txn)
                    .await?;

                Ok(model)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Fetches one record visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record is out of scope or missing, or a
    /// storage error.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<consumption_records::Model> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                consumption_records::Entity::find_by_id(id)
                    .filter(policy::consumption_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("consumption record", id))
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Lists records visible to the caller, most recent period first.
    ///
    /// A tenant with no contract links gets an empty page, not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: ConsumptionFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<consumption_records::Model>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let mut query = consumption_records::Entity::find()
                    .filter(policy::consumption_filter(&ctx, &holdings));

                if let Some(contract_id) = filter.contract_id {
                    query =
                        query.filter(consumption_records::Column::ContractId.eq(contract_id));
                }
                if let Some(kind) = filter.consumption_type {
                    query = query.filter(
                        consumption_records::Column::ConsumptionType
                            .eq(DbConsumptionType::from(kind)),
                    );
                }
                if let Some(period) = filter.period {
                    query = query
                        .filter(consumption_records::Column::Period.eq(period.to_string()));
                }

                let total = query.clone().count(txn).await?;
                // The YYYY-MM form sorts chronologically as text.
                let data = query
                    .order_by_desc(consumption_records::Column::Period)
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

    /// Deletes a record. Admin-only.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for non-admin callers, `NotFound` if the
    /// record is missing, or a storage error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                require_admin(&ctx)?;

                let holdings = policy::load_holdings(txn, &ctx).await?;
                let record = consumption_records::Entity::find_by_id(id)
                    .filter(policy::consumption_filter(&ctx, &holdings))
                    .one(txn)
                    .await?
                    .ok_or_else(|| not_found("consumption record", id))?;

                consumption_records::Entity::delete_by_id(record.id)
                    .exec(txn)
                    .await?;
                Ok::<_, RepoError>(())
            })
        })
        .await
        .map_err(AppError::from)
    }
}
