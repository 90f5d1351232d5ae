//! Core business logic for Rentora.
//!
//! This crate contains pure domain logic with ZERO web or database
//! dependencies. The access-control rules live here so they can be tested
//! exhaustively without a database and mirrored into storage-level policies.
//!
//! # Modules
//!
//! - `context` - Request context (organization, user, role)
//! - `policy` - Row-visibility scopes and the tenant write allow-list
//! - `ticket` - Ticket status lifecycle
//! - `tenancy` - Tenant-contract share validation
//! - `consumption` - Consumption natural-key rules

pub mod consumption;
pub mod context;
pub mod policy;
pub mod tenancy;
pub mod ticket;

pub use context::{RequestContext, Role};
