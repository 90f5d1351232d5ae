//! Field-level write restrictions.
//!
//! Visibility (the read predicate) and mutability (the write allow-list)
//! are deliberately separate functions: a tenant may see a ticket through a
//! broad predicate yet only ever mutate its `description`. Disallowed
//! fields are silently dropped from the patch, not rejected, so a client
//! sending extra fields observes "no change" rather than an error.

use crate::context::Role;
use crate::ticket::TicketPatch;

/// Applies the write allow-list for the given role to a ticket patch.
///
/// Landlord admins may mutate every field. Tenants keep only
/// `description`; everything else is dropped before the write is issued.
#[must_use]
pub fn restrict_ticket_patch(role: Role, patch: TicketPatch) -> TicketPatch {
    match role {
        Role::LandlordAdmin => patch,
        Role::Tenant => TicketPatch {
            description: patch.description,
            ..TicketPatch::default()
        },
    }
}
