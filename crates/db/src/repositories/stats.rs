//! Aggregation queries.
//!
//! Every aggregate applies the same policy condition as the row reads it
//! summarizes: an admin sees organization-wide numbers, a tenant sees
//! totals over exactly the rows they could list. Numbers are counts and
//! decimal sums; no floating point.

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use rentora_core::consumption::ConsumptionType;
use rentora_core::context::RequestContext;
use rentora_core::ticket::TicketStatus;
use rentora_shared::error::{AppError, AppResult};
use rentora_shared::types::BillingPeriod;

use crate::coordinator::with_context;
use crate::entities::sea_orm_active_enums::{
    ConsumptionType as DbConsumptionType, TicketStatus as DbTicketStatus,
};
use crate::entities::{buildings, consumption_records, contracts, tickets};
use crate::error::RepoError;
use crate::policy;

/// Ticket counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TicketSummary {
    /// Open tickets.
    pub open: u64,
    /// Tickets in progress.
    pub in_progress: u64,
    /// Tickets waiting for the tenant.
    pub waiting_for_tenant: u64,
    /// Resolved tickets.
    pub resolved: u64,
    /// Closed tickets.
    pub closed: u64,
}

/// Query bounds for consumption aggregation.
#[derive(Debug, Clone, Default)]
pub struct ConsumptionQuery {
    /// Restrict to one contract.
    pub contract_id: Option<Uuid>,
    /// Restrict to one consumption type.
    pub consumption_type: Option<ConsumptionType>,
    /// Inclusive lower period bound.
    pub from: Option<BillingPeriod>,
    /// Inclusive upper period bound.
    pub to: Option<BillingPeriod>,
}

/// Consumption totals for one (period, type) bucket.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PeriodTotal {
    /// Billing month.
    pub period: String,
    /// What was measured.
    pub consumption_type: ConsumptionType,
    /// Summed readings.
    pub total_reading: Decimal,
    /// Summed cost.
    pub total_cost: Decimal,
}

/// Occupancy counts across the caller's visible portfolio.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct OccupancySummary {
    /// Total rentable units across visible buildings.
    pub total_units: u64,
    /// Units with an active contract.
    pub occupied_units: u64,
}

/// Aggregation repository.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    db: DatabaseConnection,
}

impl StatsRepository {
    /// Creates a new aggregation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Counts tickets by status over the caller's visible tickets.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn ticket_summary(&self, ctx: &RequestContext) -> AppResult<TicketSummary> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let rows: Vec<(DbTicketStatus, i64)> = tickets::Entity::find()
                    .select_only()
                    .column(tickets::Column::Status)
                    .column_as(tickets::Column::Id.count(), "count")
                    .filter(policy::tickets_filter(&ctx, &holdings))
                    .group_by(tickets::Column::Status)
                    .into_tuple()
                    .all(txn)
                    .await?;

                let mut summary = TicketSummary::default();
                for (status, count) in rows {
                    let count = u64::try_from(count).unwrap_or(0);
                    match TicketStatus::from(status) {
                        TicketStatus::Open => summary.open = count,
                        TicketStatus::InProgress => summary.in_progress = count,
                        TicketStatus::WaitingForTenant => summary.waiting_for_tenant = count,
                        TicketStatus::Resolved => summary.resolved = count,
                        TicketStatus::Closed => summary.closed = count,
                    }
                }
                Ok::<_, RepoError>(summary)
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Sums consumption readings and costs per (period, type) bucket over
    /// the caller's visible records, oldest period first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn consumption_by_period(
        &self,
        ctx: &RequestContext,
        query: ConsumptionQuery,
    ) -> AppResult<Vec<PeriodTotal>> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;
                let mut select = consumption_records::Entity::find()
                    .select_only()
                    .column(consumption_records::Column::Period)
                    .column(consumption_records::Column::ConsumptionType)
                    .column_as(consumption_records::Column::Reading.sum(), "total_reading")
                    .column_as(consumption_records::Column::Cost.sum(), "total_cost")
                    .filter(policy::consumption_filter(&ctx, &holdings))
                    .group_by(consumption_records::Column::Period)
                    .group_by(consumption_records::Column::ConsumptionType)
                    .order_by_asc(consumption_records::Column::Period);

                if let Some(contract_id) = query.contract_id {
                    select =
                        select.filter(consumption_records::Column::ContractId.eq(contract_id));
                }
                if let Some(kind) = query.consumption_type {
                    select = select.filter(
                        consumption_records::Column::ConsumptionType
                            .eq(DbConsumptionType::from(kind)),
                    );
                }
                if let Some(from) = query.from {
                    select = select
                        .filter(consumption_records::Column::Period.gte(from.to_string()));
                }
                if let Some(to) = query.to {
                    select =
                        select.filter(consumption_records::Column::Period.lte(to.to_string()));
                }

                let rows: Vec<(String, DbConsumptionType, Option<Decimal>, Option<Decimal>)> =
                    select.into_tuple().all(txn).await?;

                Ok::<_, RepoError>(
                    rows.into_iter()
                        .map(|(period, kind, reading, cost)| PeriodTotal {
                            period,
                            consumption_type: kind.into(),
                            total_reading: reading.unwrap_or(Decimal::ZERO),
                            total_cost: cost.unwrap_or(Decimal::ZERO),
                        })
                        .collect(),
                )
            })
        })
        .await
        .map_err(AppError::from)
    }

    /// Counts total and occupied units over the caller's visible
    /// buildings and contracts.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn occupancy(&self, ctx: &RequestContext) -> AppResult<OccupancySummary> {
        let ctx = *ctx;
        with_context(&self.db, &ctx, move |txn| {
            Box::pin(async move {
                let holdings = policy::load_holdings(txn, &ctx).await?;

                let total_units: Option<i64> = buildings::Entity::find()
                    .select_only()
                    .column_as(buildings::Column::TotalUnits.sum(), "total")
                    .filter(policy::buildings_filter(&ctx))
                    .into_tuple()
                    .one(txn)
                    .await?
                    .flatten();

                let occupied: Option<i64> = contracts::Entity::find()
                    .select_only()
                    .column_as(
                        Expr::cust("COUNT(DISTINCT (building_id, unit_number))"),
                        "occupied",
                    )
                    .filter(policy::contracts_filter(&ctx, &holdings))
                    .filter(contracts::Column::IsActive.eq(true))
                    .into_tuple()
                    .one(txn)
                    .await?;

                Ok::<_, RepoError>(OccupancySummary {
                    total_units: total_units.and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
                    occupied_units: occupied.and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
                })
            })
        })
        .await
        .map_err(AppError::from)
    }
}
