//! Common types used across the application.

pub mod pagination;
pub mod period;

pub use pagination::{PageMeta, PageRequest, PageResponse};
pub use period::BillingPeriod;
