//! Policy-to-query translation.
//!
//! The core policy engine produces a declarative [`Scope`] per entity and
//! context; this module translates scopes into `SeaORM` [`Condition`]s that
//! repositories attach to every read and write. The translation is kept
//! mechanical on purpose: each `Scope` variant maps to exactly one SQL
//! shape, mirrored row-by-row by the pure evaluators in `rentora_core`.
//!
//! Fail-closed: any scope a filter does not expect collapses to
//! [`deny_all`], a literal `FALSE`, never to an omitted clause.

use rentora_core::context::RequestContext;
use rentora_core::policy::{scope_for, EntityKind, Scope, TenantHoldings};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{
    buildings, consumption_records, contracts, documents, invitation_tokens, organizations,
    tenant_contracts, tickets, users,
};

/// A condition that matches no row.
///
/// Used wherever a scope denies access outright: the query still runs and
/// returns an empty set, indistinguishable from "nothing there".
#[must_use]
pub fn deny_all() -> Condition {
    Condition::all().add(Expr::cust("FALSE"))
}

/// Resolves the contracts held by the context's user.
///
/// Admins never need holdings; their scopes are organization-wide, so this
/// returns empty holdings without a query. For tenants it reads the
/// tenant-contract links once; repositories resolve holdings a single time
/// per operation and reuse them for every filter in that operation.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub async fn load_holdings<C: ConnectionTrait>(
    conn: &C,
    ctx: &RequestContext,
) -> Result<TenantHoldings, DbErr> {
    if ctx.is_admin() {
        return Ok(TenantHoldings::default());
    }

    let contract_ids: Vec<Uuid> = tenant_contracts::Entity::find()
        .select_only()
        .column(tenant_contracts::Column::ContractId)
        .filter(tenant_contracts::Column::OrganizationId.eq(ctx.organization_id))
        .filter(tenant_contracts::Column::TenantId.eq(ctx.user_id))
        .into_tuple()
        .all(conn)
        .await?;

    Ok(TenantHoldings::new(contract_ids))
}

/// Visibility condition for the organizations table.
#[must_use]
pub fn organizations_filter(ctx: &RequestContext) -> Condition {
    match scope_for(EntityKind::Organization, ctx, &TenantHoldings::default()) {
        Scope::SelfOrganization => {
            Condition::all().add(organizations::Column::Id.eq(ctx.organization_id))
        }
        _ => deny_all(),
    }
}

/// Visibility condition for the users table.
#[must_use]
pub fn users_filter(ctx: &RequestContext) -> Condition {
    match scope_for(EntityKind::User, ctx, &TenantHoldings::default()) {
        Scope::Org => Condition::all().add(users::Column::OrganizationId.eq(ctx.organization_id)),
        _ => deny_all(),
    }
}

/// Visibility condition for the buildings table.
#[must_use]
pub fn buildings_filter(ctx: &RequestContext) -> Condition {
    match scope_for(EntityKind::Building, ctx, &TenantHoldings::default()) {
        Scope::Org => {
            Condition::all().add(buildings::Column::OrganizationId.eq(ctx.organization_id))
        }
        _ => deny_all(),
    }
}

/// Visibility condition for the contracts table.
#[must_use]
pub fn contracts_filter(ctx: &RequestContext, holdings: &TenantHoldings) -> Condition {
    match scope_for(EntityKind::Contract, ctx, holdings) {
        Scope::Org => {
            Condition::all().add(contracts::Column::OrganizationId.eq(ctx.organization_id))
        }
        Scope::OrgAndContractIn(ids) => Condition::all()
            .add(contracts::Column::OrganizationId.eq(ctx.organization_id))
            .add(contracts::Column::Id.is_in(ids)),
        _ => deny_all(),
    }
}

/// Visibility condition for the tenant-contract link table.
#[must_use]
pub fn tenant_contracts_filter(ctx: &RequestContext) -> Condition {
    match scope_for(EntityKind::TenantContract, ctx, &TenantHoldings::default()) {
        Scope::Org => Condition::all()
            .add(tenant_contracts::Column::OrganizationId.eq(ctx.organization_id)),
        Scope::OrgAndTenantSelf(user_id) => Condition::all()
            .add(tenant_contracts::Column::OrganizationId.eq(ctx.organization_id))
            .add(tenant_contracts::Column::TenantId.eq(user_id)),
        _ => deny_all(),
    }
}

/// Visibility condition for the tickets table.
#[must_use]
pub fn tickets_filter(ctx: &RequestContext, holdings: &TenantHoldings) -> Condition {
    match scope_for(EntityKind::Ticket, ctx, holdings) {
        Scope::Org => {
            Condition::all().add(tickets::Column::OrganizationId.eq(ctx.organization_id))
        }
        Scope::OrgAndTicketScope {
            user_id,
            contract_ids,
        } => {
            let mut narrowing = Condition::any().add(tickets::Column::CreatedById.eq(user_id));
            if !contract_ids.is_empty() {
                narrowing = narrowing.add(tickets::Column::ContractId.is_in(contract_ids));
            }
            Condition::all()
                .add(tickets::Column::OrganizationId.eq(ctx.organization_id))
                .add(narrowing)
        }
        _ => deny_all(),
    }
}

/// Visibility condition for the consumption-records table.
#[must_use]
pub fn consumption_filter(ctx: &RequestContext, holdings: &TenantHoldings) -> Condition {
    match scope_for(EntityKind::ConsumptionRecord, ctx, holdings) {
        Scope::Org => Condition::all()
            .add(consumption_records::Column::OrganizationId.eq(ctx.organization_id)),
        Scope::OrgAndContractIn(ids) => Condition::all()
            .add(consumption_records::Column::OrganizationId.eq(ctx.organization_id))
            .add(consumption_records::Column::ContractId.is_in(ids)),
        _ => deny_all(),
    }
}

/// Visibility condition for the documents table.
///
/// The "attached to a ticket the user created" branch resolves through a
/// subquery on tickets rather than a join, so the condition composes with
/// any outer query shape.
#[must_use]
pub fn documents_filter(ctx: &RequestContext, holdings: &TenantHoldings) -> Condition {
    match scope_for(EntityKind::Document, ctx, holdings) {
        Scope::Org => {
            Condition::all().add(documents::Column::OrganizationId.eq(ctx.organization_id))
        }
        Scope::OrgAndDocumentScope {
            user_id,
            contract_ids,
        } => {
            let own_tickets = Query::select()
                .column(tickets::Column::Id)
                .from(tickets::Entity)
                .and_where(Expr::col(tickets::Column::CreatedById).eq(user_id))
                .to_owned();

            let mut narrowing = Condition::any()
                .add(documents::Column::IsPublic.eq(true))
                .add(documents::Column::UploadedById.eq(user_id))
                .add(documents::Column::TicketId.in_subquery(own_tickets));
            if !contract_ids.is_empty() {
                narrowing = narrowing.add(documents::Column::ContractId.is_in(contract_ids));
            }
            Condition::all()
                .add(documents::Column::OrganizationId.eq(ctx.organization_id))
                .add(narrowing)
        }
        _ => deny_all(),
    }
}

/// Visibility condition for the invitation-tokens table. Tenants always
/// get the deny-all condition.
#[must_use]
pub fn invitations_filter(ctx: &RequestContext) -> Condition {
    match scope_for(EntityKind::InvitationToken, ctx, &TenantHoldings::default()) {
        Scope::Org => Condition::all()
            .add(invitation_tokens::Column::OrganizationId.eq(ctx.organization_id)),
        _ => deny_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentora_core::context::Role;

    fn tenant_ctx() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), Role::Tenant)
    }

    #[test]
    fn test_tenant_with_no_contracts_gets_false_literal() {
        let ctx = tenant_ctx();
        let cond = contracts_filter(&ctx, &TenantHoldings::default());
        assert_eq!(format!("{cond:?}"), format!("{:?}", deny_all()));
    }

    #[test]
    fn test_tenant_invitations_always_denied() {
        let ctx = tenant_ctx();
        let cond = invitations_filter(&ctx);
        assert_eq!(format!("{cond:?}"), format!("{:?}", deny_all()));
    }

    #[test]
    fn test_contract_filter_carries_in_list() {
        let ctx = tenant_ctx();
        let held = vec![Uuid::new_v4(), Uuid::new_v4()];
        let cond = contracts_filter(&ctx, &TenantHoldings::new(held));
        // Two clauses: org match and the IN-list.
        let rendered = format!("{cond:?}");
        assert!(rendered.contains("organization_id"));
    }
}
