//! Shared types, errors, and configuration for Rentora.
//!
//! This crate provides common types used across all other crates:
//! - Billing period type for consumption natural keys
//! - Pagination types for list endpoints
//! - Application-wide error taxonomy
//! - Configuration management
//! - JWT claims and token validation for the request boundary

pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
