//! `SeaORM` Entity for the users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

/// User row. The role decides which policy predicate applies to their
/// queries.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Unique email address.
    #[sea_orm(unique)]
    pub email: String,
    /// Full display name.
    pub full_name: String,
    /// Role within the organization.
    pub role: UserRole,
    /// Whether the user may authenticate.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning organization.
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    /// Contract links held by this user (tenant role).
    #[sea_orm(has_many = "super::tenant_contracts::Entity")]
    TenantContracts,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::tenant_contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantContracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
