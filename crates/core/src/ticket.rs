//! Ticket lifecycle types.
//!
//! Status flow: `open → in_progress ⇄ waiting_for_tenant → resolved →
//! closed`. Resolved and closed are terminal for the normal flow; an admin
//! may reopen either back to `open`, which clears the resolution timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly created, nobody working on it yet.
    Open,
    /// An admin is actively working on the ticket.
    InProgress,
    /// Blocked on a response from the tenant.
    WaitingForTenant,
    /// Work finished; awaiting final closure.
    Resolved,
    /// Closed; no further action expected.
    Closed,
}

impl TicketStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::WaitingForTenant => "waiting_for_tenant",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "in_progress" => Some(Self::InProgress),
            "waiting_for_tenant" => Some(Self::WaitingForTenant),
            "resolved" => Some(Self::Resolved),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns true if the status marks the ticket as dealt with.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }

    /// Returns true if `next` is a valid forward transition from `self`.
    ///
    /// Reopening (`resolved`/`closed` → `open`) is valid but admin-only;
    /// see [`TicketStatus::is_reopen`]. Setting the same status again is a
    /// no-op and always allowed.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Self::Open, Self::InProgress)
                | (Self::InProgress, Self::WaitingForTenant | Self::Resolved)
                | (Self::WaitingForTenant, Self::InProgress)
                | (Self::Resolved, Self::Closed)
                | (Self::Resolved | Self::Closed, Self::Open)
        )
    }

    /// Returns true if moving from `self` to `next` reopens a settled
    /// ticket. Reopening is an admin action, never exposed to tenants.
    #[must_use]
    pub fn is_reopen(&self, next: Self) -> bool {
        self.is_settled() && next == Self::Open
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    /// Can wait.
    Low,
    /// Default priority.
    #[default]
    Medium,
    /// Needs prompt attention.
    High,
    /// Drop everything.
    Urgent,
}

impl TicketPriority {
    /// Returns the string representation of the priority.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// Ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    /// Repairs and upkeep.
    Maintenance,
    /// Rent, deposits, and other payments.
    Payment,
    /// Noise, neighbours, shared spaces.
    Complaint,
    /// Everything else.
    #[default]
    General,
}

impl TicketCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Payment => "payment",
            Self::Complaint => "complaint",
            Self::General => "general",
        }
    }
}

/// A partial update to a ticket.
///
/// `None` means "leave unchanged". For tenant callers the policy engine
/// strips every field except `description` before the write is issued.
#[derive(Debug, Clone, Default)]
pub struct TicketPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status (must be a valid transition).
    pub status: Option<TicketStatus>,
    /// New priority.
    pub priority: Option<TicketPriority>,
    /// New category.
    pub category: Option<TicketCategory>,
    /// Assignee change; `Some(None)` unassigns.
    pub assigned_to_id: Option<Option<Uuid>>,
    /// Explicit resolution timestamp, honored only when the patch moves the
    /// ticket into a settled status.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl TicketPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.assigned_to_id.is_none()
            && self.resolved_at.is_none()
    }
}

/// Computes the `resolved_at` value after a status change.
///
/// - Entering `resolved`/`closed` from an unsettled status stamps the time
///   (an explicit timestamp from the admin wins over `now`).
/// - A ticket that is already settled keeps its original timestamp; settling
///   it again is a no-op for the timestamp.
/// - Reopening clears it.
#[must_use]
pub fn resolution_timestamp(
    current: TicketStatus,
    next: TicketStatus,
    existing: Option<DateTime<Utc>>,
    explicit: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if next == TicketStatus::Open {
        return None;
    }
    if next.is_settled() {
        if current.is_settled() {
            // Already settled: first resolution time sticks.
            return existing;
        }
        return Some(explicit.unwrap_or(now));
    }
    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(TicketStatus::Open, TicketStatus::InProgress, true)]
    #[case(TicketStatus::InProgress, TicketStatus::WaitingForTenant, true)]
    #[case(TicketStatus::WaitingForTenant, TicketStatus::InProgress, true)]
    #[case(TicketStatus::InProgress, TicketStatus::Resolved, true)]
    #[case(TicketStatus::Resolved, TicketStatus::Closed, true)]
    #[case(TicketStatus::Resolved, TicketStatus::Open, true)]
    #[case(TicketStatus::Closed, TicketStatus::Open, true)]
    #[case(TicketStatus::Open, TicketStatus::Resolved, false)]
    #[case(TicketStatus::Open, TicketStatus::Closed, false)]
    #[case(TicketStatus::Open, TicketStatus::WaitingForTenant, false)]
    #[case(TicketStatus::WaitingForTenant, TicketStatus::Resolved, false)]
    #[case(TicketStatus::Closed, TicketStatus::Resolved, false)]
    #[case(TicketStatus::Closed, TicketStatus::InProgress, false)]
    fn test_transitions(
        #[case] from: TicketStatus,
        #[case] to: TicketStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_same_status_is_noop_transition() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::WaitingForTenant,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn test_reopen_detection() {
        assert!(TicketStatus::Resolved.is_reopen(TicketStatus::Open));
        assert!(TicketStatus::Closed.is_reopen(TicketStatus::Open));
        assert!(!TicketStatus::InProgress.is_reopen(TicketStatus::Open));
        assert!(!TicketStatus::Resolved.is_reopen(TicketStatus::Closed));
    }

    #[test]
    fn test_resolution_stamped_on_resolve() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let stamped = resolution_timestamp(
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            None,
            None,
            now,
        );
        assert_eq!(stamped, Some(now));
    }

    #[test]
    fn test_explicit_resolution_date_wins() {
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let explicit = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
        let stamped = resolution_timestamp(
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            None,
            Some(explicit),
            now,
        );
        assert_eq!(stamped, Some(explicit));
    }

    #[test]
    fn test_re_resolving_keeps_first_timestamp() {
        let first = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();

        // resolved -> resolved
        let kept = resolution_timestamp(
            TicketStatus::Resolved,
            TicketStatus::Resolved,
            Some(first),
            None,
            later,
        );
        assert_eq!(kept, Some(first));

        // resolved -> closed keeps the resolution time too
        let kept = resolution_timestamp(
            TicketStatus::Resolved,
            TicketStatus::Closed,
            Some(first),
            None,
            later,
        );
        assert_eq!(kept, Some(first));
    }

    #[test]
    fn test_reopen_clears_timestamp() {
        let first = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
        let cleared = resolution_timestamp(
            TicketStatus::Resolved,
            TicketStatus::Open,
            Some(first),
            None,
            now,
        );
        assert_eq!(cleared, None);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::WaitingForTenant,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TicketStatus::parse("reopened"), None);
    }
}
