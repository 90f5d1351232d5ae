//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for all tenant tables
//! - The request-context guard that binds a context triple to one
//!   transaction (`ScopedConnection`)
//! - The transaction coordinator for atomic multi-entity flows
//! - Policy-to-query translation and repositories that apply it to every
//!   read and write
//! - Database migrations, including row-level security policies

pub mod context;
pub mod coordinator;
pub mod entities;
pub mod error;
pub mod migration;
pub mod policy;
pub mod repositories;

pub use context::{ScopedConnection, ScopedConnectionExt};
pub use coordinator::with_context;
pub use error::storage_error;
pub use repositories::{
    BuildingRepository, ConsumptionRepository, ContractRepository, DocumentRepository,
    InvitationRepository, OrganizationRepository, StatsRepository, TenantContractRepository,
    TicketRepository, UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
