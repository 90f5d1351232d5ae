//! The policy engine: declarative row-visibility scopes.
//!
//! Given an entity kind and a request context, [`scope_for`] produces the
//! [`Scope`] a row must satisfy to be visible. The database layer translates
//! scopes into query conditions; the pure evaluators in this module mirror
//! that translation row-by-row so the two can be checked against each other
//! in tests.
//!
//! The rules, per role:
//!
//! - `landlord_admin`: organization match only, for every entity.
//! - `tenant`: organization match AND a per-entity narrowing: contracts the
//!   tenant holds, rows they created, or documents marked public. Invitation
//!   tokens are always denied to tenants.
//!
//! A tenant with zero linked contracts gets an explicit [`Scope::Denied`]
//! for contract-scoped entities: zero rows, never an omitted clause and
//! never an empty `IN ()` list.

pub mod write;

use uuid::Uuid;

use crate::context::RequestContext;

/// The entities the policy engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// The organization record itself.
    Organization,
    /// Users within an organization.
    User,
    /// Buildings.
    Building,
    /// Rental contracts.
    Contract,
    /// Tenant-contract links.
    TenantContract,
    /// Maintenance and service tickets.
    Ticket,
    /// Utility consumption records.
    ConsumptionRecord,
    /// Uploaded documents.
    Document,
    /// Invitation tokens (admin-only).
    InvitationToken,
}

/// The contracts a tenant holds, resolved once per operation from the
/// tenant-contract links of the context's user.
#[derive(Debug, Clone, Default)]
pub struct TenantHoldings {
    /// IDs of contracts linked to the user.
    pub contract_ids: Vec<Uuid>,
}

impl TenantHoldings {
    /// Creates holdings from a list of contract IDs.
    #[must_use]
    pub fn new(contract_ids: Vec<Uuid>) -> Self {
        Self { contract_ids }
    }

    /// Returns true if the tenant holds the given contract.
    #[must_use]
    pub fn holds(&self, contract_id: Uuid) -> bool {
        self.contract_ids.contains(&contract_id)
    }

    /// Returns true if the tenant holds no contracts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contract_ids.is_empty()
    }
}

/// Row-visibility scope for one entity under one context.
///
/// Each variant names exactly the predicate the storage layer must apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// No row is visible. Must translate to a false literal.
    Denied,
    /// `organization_id == ctx.organization_id`.
    Org,
    /// The organization row itself: `id == ctx.organization_id`.
    SelfOrganization,
    /// Org match AND the row's contract is one the tenant holds.
    OrgAndContractIn(Vec<Uuid>),
    /// Org match AND `tenant_id == ctx.user_id` (tenant-contract links).
    OrgAndTenantSelf(Uuid),
    /// Org match AND (created by the user OR tied to a held contract).
    OrgAndTicketScope {
        /// The context's user.
        user_id: Uuid,
        /// Contracts the tenant holds.
        contract_ids: Vec<Uuid>,
    },
    /// Org match AND (public OR uploaded by the user OR tied to a held
    /// contract OR attached to a ticket the user created).
    OrgAndDocumentScope {
        /// The context's user.
        user_id: Uuid,
        /// Contracts the tenant holds.
        contract_ids: Vec<Uuid>,
    },
}

/// Produces the row-visibility scope for an entity under the given context.
///
/// Pure function of `(entity, context, holdings)`; the same table drives the
/// storage-level condition building and the pure evaluators below.
#[must_use]
pub fn scope_for(entity: EntityKind, ctx: &RequestContext, holdings: &TenantHoldings) -> Scope {
    if ctx.is_admin() {
        return match entity {
            EntityKind::Organization => Scope::SelfOrganization,
            _ => Scope::Org,
        };
    }

    match entity {
        EntityKind::Organization => Scope::SelfOrganization,
        // Tenants see co-tenants and admins within the org; writes are a
        // separate concern handled by the services.
        EntityKind::User | EntityKind::Building => Scope::Org,
        EntityKind::Contract | EntityKind::ConsumptionRecord => {
            if holdings.is_empty() {
                Scope::Denied
            } else {
                Scope::OrgAndContractIn(holdings.contract_ids.clone())
            }
        }
        EntityKind::TenantContract => Scope::OrgAndTenantSelf(ctx.user_id),
        EntityKind::Ticket => Scope::OrgAndTicketScope {
            user_id: ctx.user_id,
            contract_ids: holdings.contract_ids.clone(),
        },
        EntityKind::Document => Scope::OrgAndDocumentScope {
            user_id: ctx.user_id,
            contract_ids: holdings.contract_ids.clone(),
        },
        EntityKind::InvitationToken => Scope::Denied,
    }
}

// ============================================================================
// Pure row evaluators
//
// These mirror the storage-level conditions one row at a time. They exist so
// the predicate table can be property-tested without a database and audited
// against the SQL translation.
// ============================================================================

/// The fields of a ticket row the policy inspects.
#[derive(Debug, Clone, Copy)]
pub struct TicketRow {
    /// Owning organization.
    pub organization_id: Uuid,
    /// User who created the ticket.
    pub created_by_id: Uuid,
    /// Contract the ticket is tied to, if any.
    pub contract_id: Option<Uuid>,
}

/// The fields of a document row the policy inspects.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRow {
    /// Owning organization.
    pub organization_id: Uuid,
    /// User who uploaded the document.
    pub uploaded_by_id: Uuid,
    /// Contract the document is tied to, if any.
    pub contract_id: Option<Uuid>,
    /// Ticket the document is attached to, if any.
    pub ticket_id: Option<Uuid>,
    /// Whether the document is visible to every tenant in the organization.
    pub is_public: bool,
}

/// Evaluates whether a ticket row is visible under the context.
#[must_use]
pub fn ticket_visible(ctx: &RequestContext, holdings: &TenantHoldings, row: &TicketRow) -> bool {
    if row.organization_id != ctx.organization_id {
        return false;
    }
    if ctx.is_admin() {
        return true;
    }
    row.created_by_id == ctx.user_id || row.contract_id.is_some_and(|c| holdings.holds(c))
}

/// Evaluates whether a document row is visible under the context.
///
/// `ticket_creator` is the creator of the linked ticket, if the document is
/// attached to one; the storage layer resolves it with a subquery.
#[must_use]
pub fn document_visible(
    ctx: &RequestContext,
    holdings: &TenantHoldings,
    row: &DocumentRow,
    ticket_creator: Option<Uuid>,
) -> bool {
    if row.organization_id != ctx.organization_id {
        return false;
    }
    if ctx.is_admin() {
        return true;
    }
    row.is_public
        || row.uploaded_by_id == ctx.user_id
        || row.contract_id.is_some_and(|c| holdings.holds(c))
        || (row.ticket_id.is_some() && ticket_creator == Some(ctx.user_id))
}

/// Evaluates whether a contract-keyed row (contract, consumption record) is
/// visible under the context.
#[must_use]
pub fn contract_row_visible(
    ctx: &RequestContext,
    holdings: &TenantHoldings,
    organization_id: Uuid,
    contract_id: Uuid,
) -> bool {
    if organization_id != ctx.organization_id {
        return false;
    }
    ctx.is_admin() || holdings.holds(contract_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Role;
    use proptest::prelude::*;

    fn admin_ctx(org: Uuid) -> RequestContext {
        RequestContext::new(org, Uuid::new_v4(), Role::LandlordAdmin)
    }

    fn tenant_ctx(org: Uuid, user: Uuid) -> RequestContext {
        RequestContext::new(org, user, Role::Tenant)
    }

    #[test]
    fn test_admin_scope_is_org_match_everywhere() {
        let ctx = admin_ctx(Uuid::new_v4());
        let holdings = TenantHoldings::default();

        for entity in [
            EntityKind::User,
            EntityKind::Building,
            EntityKind::Contract,
            EntityKind::TenantContract,
            EntityKind::Ticket,
            EntityKind::ConsumptionRecord,
            EntityKind::Document,
            EntityKind::InvitationToken,
        ] {
            assert_eq!(scope_for(entity, &ctx, &holdings), Scope::Org);
        }
        assert_eq!(
            scope_for(EntityKind::Organization, &ctx, &holdings),
            Scope::SelfOrganization
        );
    }

    #[test]
    fn test_tenant_denied_invitation_tokens() {
        let ctx = tenant_ctx(Uuid::new_v4(), Uuid::new_v4());
        let holdings = TenantHoldings::new(vec![Uuid::new_v4()]);
        assert_eq!(
            scope_for(EntityKind::InvitationToken, &ctx, &holdings),
            Scope::Denied
        );
    }

    #[test]
    fn test_tenant_with_no_contracts_gets_explicit_denial() {
        let ctx = tenant_ctx(Uuid::new_v4(), Uuid::new_v4());
        let holdings = TenantHoldings::default();

        // Contract-scoped entities collapse to Denied, never to an empty
        // IN-list and never to "all rows".
        assert_eq!(
            scope_for(EntityKind::Contract, &ctx, &holdings),
            Scope::Denied
        );
        assert_eq!(
            scope_for(EntityKind::ConsumptionRecord, &ctx, &holdings),
            Scope::Denied
        );

        // Ticket and document scopes survive: created-by and is-public
        // branches do not depend on holdings.
        assert!(matches!(
            scope_for(EntityKind::Ticket, &ctx, &holdings),
            Scope::OrgAndTicketScope { .. }
        ));
        assert!(matches!(
            scope_for(EntityKind::Document, &ctx, &holdings),
            Scope::OrgAndDocumentScope { .. }
        ));
    }

    #[test]
    fn test_tenant_contract_scope_is_self() {
        let user = Uuid::new_v4();
        let ctx = tenant_ctx(Uuid::new_v4(), user);
        assert_eq!(
            scope_for(EntityKind::TenantContract, &ctx, &TenantHoldings::default()),
            Scope::OrgAndTenantSelf(user)
        );
    }

    #[test]
    fn test_ticket_visibility_by_creation() {
        let org = Uuid::new_v4();
        let user = Uuid::new_v4();
        let ctx = tenant_ctx(org, user);
        let holdings = TenantHoldings::default();

        let own = TicketRow {
            organization_id: org,
            created_by_id: user,
            contract_id: None,
        };
        let foreign = TicketRow {
            organization_id: org,
            created_by_id: Uuid::new_v4(),
            contract_id: None,
        };

        assert!(ticket_visible(&ctx, &holdings, &own));
        assert!(!ticket_visible(&ctx, &holdings, &foreign));
    }

    #[test]
    fn test_ticket_visibility_by_contract() {
        let org = Uuid::new_v4();
        let contract = Uuid::new_v4();
        let ctx = tenant_ctx(org, Uuid::new_v4());
        let holdings = TenantHoldings::new(vec![contract]);

        let on_held_contract = TicketRow {
            organization_id: org,
            created_by_id: Uuid::new_v4(),
            contract_id: Some(contract),
        };
        assert!(ticket_visible(&ctx, &holdings, &on_held_contract));

        let on_other_contract = TicketRow {
            contract_id: Some(Uuid::new_v4()),
            ..on_held_contract
        };
        assert!(!ticket_visible(&ctx, &holdings, &on_other_contract));
    }

    #[test]
    fn test_public_document_visible_to_any_tenant_in_org() {
        let org = Uuid::new_v4();
        let ctx = tenant_ctx(org, Uuid::new_v4());
        let row = DocumentRow {
            organization_id: org,
            uploaded_by_id: Uuid::new_v4(),
            contract_id: None,
            ticket_id: None,
            is_public: true,
        };
        assert!(document_visible(&ctx, &TenantHoldings::default(), &row, None));
    }

    #[test]
    fn test_document_via_own_ticket() {
        let org = Uuid::new_v4();
        let user = Uuid::new_v4();
        let ctx = tenant_ctx(org, user);
        let ticket_id = Uuid::new_v4();
        let row = DocumentRow {
            organization_id: org,
            uploaded_by_id: Uuid::new_v4(),
            contract_id: None,
            ticket_id: Some(ticket_id),
            is_public: false,
        };

        assert!(document_visible(
            &ctx,
            &TenantHoldings::default(),
            &row,
            Some(user)
        ));
        assert!(!document_visible(
            &ctx,
            &TenantHoldings::default(),
            &row,
            Some(Uuid::new_v4())
        ));
    }

    proptest! {
        /// No scope ever makes a row from another organization visible,
        /// for any role and any holdings.
        #[test]
        fn prop_cross_org_rows_never_visible(
            admin in any::<bool>(),
            held in prop::collection::vec(any::<u128>(), 0..5),
        ) {
            let org = Uuid::new_v4();
            let other_org = Uuid::new_v4();
            let user = Uuid::new_v4();
            let role = if admin { Role::LandlordAdmin } else { Role::Tenant };
            let ctx = RequestContext::new(org, user, role);
            let holdings = TenantHoldings::new(
                held.into_iter().map(Uuid::from_u128).collect(),
            );

            let ticket = TicketRow {
                organization_id: other_org,
                created_by_id: user,
                contract_id: holdings.contract_ids.first().copied(),
            };
            prop_assert!(!ticket_visible(&ctx, &holdings, &ticket));

            let document = DocumentRow {
                organization_id: other_org,
                uploaded_by_id: user,
                contract_id: holdings.contract_ids.first().copied(),
                ticket_id: None,
                is_public: true,
            };
            prop_assert!(!document_visible(&ctx, &holdings, &document, None));

            if let Some(contract) = holdings.contract_ids.first() {
                prop_assert!(!contract_row_visible(&ctx, &holdings, other_org, *contract));
            }
        }

        /// A contract-keyed row is visible to a tenant exactly when the
        /// contract is among their holdings.
        #[test]
        fn prop_contract_row_visibility_matches_holdings(
            held in prop::collection::vec(any::<u128>(), 0..8),
            probe in any::<u128>(),
        ) {
            let org = Uuid::new_v4();
            let ctx = tenant_ctx(org, Uuid::new_v4());
            let holdings = TenantHoldings::new(
                held.into_iter().map(Uuid::from_u128).collect(),
            );
            let contract = Uuid::from_u128(probe);

            prop_assert_eq!(
                contract_row_visible(&ctx, &holdings, org, contract),
                holdings.holds(contract)
            );
        }
    }
}
