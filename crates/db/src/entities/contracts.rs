//! `SeaORM` Entity for the contracts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Rental contract row. At most one active contract per (building, unit)
/// at a time, checked by the repository inside the writing transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub building_id: Uuid,
    /// Unique per organization.
    pub contract_number: String,
    pub unit_number: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    /// Monthly rent.
    pub rent_amount: Decimal,
    pub is_active: bool,
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
        belongs_to = "super::buildings::Entity",
        from = "Column::BuildingId",
        to = "super::buildings::Column::Id"
    )]
    Buildings,
    #[sea_orm(has_many = "super::tenant_contracts::Entity")]
    TenantContracts,
    #[sea_orm(has_many = "super::consumption_records::Entity")]
    ConsumptionRecords,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::buildings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Buildings.def()
    }
}

impl Related<super::tenant_contracts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantContracts.def()
    }
}

impl Related<super::consumption_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsumptionRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
