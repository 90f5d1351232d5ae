//! `SeaORM` Entity for the invitation_tokens table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invitation token row. Admin-only entity; tenants never see it. The
/// token itself is stored hashed, never in the clear.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invitation_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub contract_id: Uuid,
    /// SHA-256 of the issued token.
    #[sea_orm(unique)]
    pub token_hash: String,
    /// Email the invitation was issued for.
    pub email: String,
    /// Share of the unit granted on acceptance.
    pub percentage: Decimal,
    pub expires_at: DateTimeWithTimeZone,
    /// Null until the invitation is consumed.
    pub used_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(
        belongs_to = "super::contracts::Entity",
        from = "Column::ContractId",
        to = "super::contracts::Column::Id"
    )]
    Contracts,
}

impl Related<super::contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
