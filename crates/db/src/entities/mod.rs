//! `SeaORM` entity definitions.

pub mod buildings;
pub mod consumption_records;
pub mod contracts;
pub mod documents;
pub mod invitation_tokens;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod tenant_contracts;
pub mod tickets;
pub mod users;
