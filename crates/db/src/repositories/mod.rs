//! Repository abstractions for data access.
//!
//! Every repository method takes the request context explicitly and runs
//! inside one context-bound transaction: the policy condition is attached
//! to the query, and the same context is exported to the database for the
//! row-level security backstop. No method reads or writes outside a
//! policy-filtered query.

pub mod building;
pub mod consumption;
pub mod contract;
pub mod document;
pub mod invitation;
pub mod organization;
pub mod stats;
pub mod tenant_contract;
pub mod ticket;
pub mod user;

pub use building::{BuildingRepository, CreateBuildingInput, UpdateBuildingInput};
pub use consumption::{ConsumptionFilter, ConsumptionRepository, RecordConsumptionInput};
pub use contract::{
    ContractFilter, ContractRepository, CreateContractInput, TerminateContractInput,
    UpdateContractInput,
};
pub use document::{
    CreateDocumentInput, DocumentFilter, DocumentRepository, UpdateDocumentInput,
};
pub use invitation::{
    AcceptInvitationInput, AcceptedInvitation, InvitationRepository, InviteTenantInput,
    IssuedInvitation,
};
pub use organization::{CreateOrganizationInput, OrganizationRepository, UpdateOrganizationInput};
pub use stats::{ConsumptionQuery, OccupancySummary, PeriodTotal, StatsRepository, TicketSummary};
pub use tenant_contract::{AddTenantInput, TenantContractRepository};
pub use ticket::{CreateTicketInput, TicketFilter, TicketRepository};
pub use user::{CreateUserInput, UserRepository};

use rentora_core::context::RequestContext;
use rentora_shared::error::AppError;

use crate::error::RepoError;

/// Rejects non-admin contexts for admin-only operations.
///
/// The resulting `AccessDenied` reaches clients as a 404, indistinguishable
/// from a missing row.
pub(crate) fn require_admin(ctx: &RequestContext) -> Result<(), RepoError> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(RepoError::App(AppError::AccessDenied(
            "administrator role required".to_string(),
        )))
    }
}

/// Builds the not-found error for a missing or out-of-scope row.
pub(crate) fn not_found(what: &str, id: uuid::Uuid) -> RepoError {
    RepoError::App(AppError::NotFound(format!("{what} {id}")))
}
