//! Request context types.
//!
//! The context triple (organization, user, role) is established once per
//! inbound request from the authenticated session and carried to every
//! query. It is never a process-wide value; each request owns its own
//! context, and the database layer binds it to a single transaction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of the authenticated user within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Landlord administrator: full access within the organization.
    LandlordAdmin,
    /// Tenant: access limited to records tied to their own contracts.
    Tenant,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LandlordAdmin => "landlord_admin",
            Self::Tenant => "tenant",
        }
    }

    /// Parses a role from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "landlord_admin" => Some(Self::LandlordAdmin),
            "tenant" => Some(Self::Tenant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authenticated request's context triple.
///
/// Populated at the start of a request, read by every query through the
/// policy engine, and dropped when the request's transaction ends. Two
/// concurrent requests never share a `RequestContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// The organization the user is acting within.
    pub organization_id: Uuid,
    /// The authenticated user.
    pub user_id: Uuid,
    /// The user's role.
    pub role: Role,
}

impl RequestContext {
    /// Creates a new request context.
    #[must_use]
    pub const fn new(organization_id: Uuid, user_id: Uuid, role: Role) -> Self {
        Self {
            organization_id,
            user_id,
            role,
        }
    }

    /// Returns true if the context belongs to a landlord administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::LandlordAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::LandlordAdmin, Role::Tenant] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_is_admin() {
        let org = Uuid::new_v4();
        let user = Uuid::new_v4();
        assert!(RequestContext::new(org, user, Role::LandlordAdmin).is_admin());
        assert!(!RequestContext::new(org, user, Role::Tenant).is_admin());
    }
}
