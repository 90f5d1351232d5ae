//! Postgres enum mappings.
//!
//! Each database enum mirrors a domain enum from `rentora-core`; the `From`
//! impls keep the two in lockstep so repositories convert at the boundary
//! instead of stringly-typing.

use rentora_core::consumption::ConsumptionType as CoreConsumptionType;
use rentora_core::context::Role;
use rentora_core::ticket::{
    TicketCategory as CoreTicketCategory, TicketPriority as CoreTicketPriority,
    TicketStatus as CoreTicketStatus,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Landlord administrator.
    #[sea_orm(string_value = "landlord_admin")]
    LandlordAdmin,
    /// Tenant.
    #[sea_orm(string_value = "tenant")]
    Tenant,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::LandlordAdmin => Self::LandlordAdmin,
            Role::Tenant => Self::Tenant,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::LandlordAdmin => Self::LandlordAdmin,
            UserRole::Tenant => Self::Tenant,
        }
    }
}

/// Ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_status")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly created.
    #[sea_orm(string_value = "open")]
    Open,
    /// Being worked on.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Blocked on the tenant.
    #[sea_orm(string_value = "waiting_for_tenant")]
    WaitingForTenant,
    /// Work finished.
    #[sea_orm(string_value = "resolved")]
    Resolved,
    /// Closed.
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl From<CoreTicketStatus> for TicketStatus {
    fn from(status: CoreTicketStatus) -> Self {
        match status {
            CoreTicketStatus::Open => Self::Open,
            CoreTicketStatus::InProgress => Self::InProgress,
            CoreTicketStatus::WaitingForTenant => Self::WaitingForTenant,
            CoreTicketStatus::Resolved => Self::Resolved,
            CoreTicketStatus::Closed => Self::Closed,
        }
    }
}

impl From<TicketStatus> for CoreTicketStatus {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Open => Self::Open,
            TicketStatus::InProgress => Self::InProgress,
            TicketStatus::WaitingForTenant => Self::WaitingForTenant,
            TicketStatus::Resolved => Self::Resolved,
            TicketStatus::Closed => Self::Closed,
        }
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_priority")]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    /// Can wait.
    #[sea_orm(string_value = "low")]
    Low,
    /// Default.
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Needs prompt attention.
    #[sea_orm(string_value = "high")]
    High,
    /// Drop everything.
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

impl From<CoreTicketPriority> for TicketPriority {
    fn from(priority: CoreTicketPriority) -> Self {
        match priority {
            CoreTicketPriority::Low => Self::Low,
            CoreTicketPriority::Medium => Self::Medium,
            CoreTicketPriority::High => Self::High,
            CoreTicketPriority::Urgent => Self::Urgent,
        }
    }
}

impl From<TicketPriority> for CoreTicketPriority {
    fn from(priority: TicketPriority) -> Self {
        match priority {
            TicketPriority::Low => Self::Low,
            TicketPriority::Medium => Self::Medium,
            TicketPriority::High => Self::High,
            TicketPriority::Urgent => Self::Urgent,
        }
    }
}

/// Ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_category")]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    /// Repairs and upkeep.
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    /// Rent and payments.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Complaints.
    #[sea_orm(string_value = "complaint")]
    Complaint,
    /// Everything else.
    #[sea_orm(string_value = "general")]
    General,
}

impl From<CoreTicketCategory> for TicketCategory {
    fn from(category: CoreTicketCategory) -> Self {
        match category {
            CoreTicketCategory::Maintenance => Self::Maintenance,
            CoreTicketCategory::Payment => Self::Payment,
            CoreTicketCategory::Complaint => Self::Complaint,
            CoreTicketCategory::General => Self::General,
        }
    }
}

impl From<TicketCategory> for CoreTicketCategory {
    fn from(category: TicketCategory) -> Self {
        match category {
            TicketCategory::Maintenance => Self::Maintenance,
            TicketCategory::Payment => Self::Payment,
            TicketCategory::Complaint => Self::Complaint,
            TicketCategory::General => Self::General,
        }
    }
}

/// Kind of utility a consumption record measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "consumption_type")]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionType {
    /// Electricity.
    #[sea_orm(string_value = "electricity")]
    Electricity,
    /// Water.
    #[sea_orm(string_value = "water")]
    Water,
    /// Gas.
    #[sea_orm(string_value = "gas")]
    Gas,
    /// Heating.
    #[sea_orm(string_value = "heating")]
    Heating,
    /// Other metered utilities.
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<CoreConsumptionType> for ConsumptionType {
    fn from(kind: CoreConsumptionType) -> Self {
        match kind {
            CoreConsumptionType::Electricity => Self::Electricity,
            CoreConsumptionType::Water => Self::Water,
            CoreConsumptionType::Gas => Self::Gas,
            CoreConsumptionType::Heating => Self::Heating,
            CoreConsumptionType::Other => Self::Other,
        }
    }
}

impl From<ConsumptionType> for CoreConsumptionType {
    fn from(kind: ConsumptionType) -> Self {
        match kind {
            ConsumptionType::Electricity => Self::Electricity,
            ConsumptionType::Water => Self::Water,
            ConsumptionType::Gas => Self::Gas,
            ConsumptionType::Heating => Self::Heating,
            ConsumptionType::Other => Self::Other,
        }
    }
}
