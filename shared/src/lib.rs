//! Shared types and domain logic for the Resale Operations backend
//!
//! This crate contains the record models, business-date handling, and the
//! pure sales-summary reconciliation planner used by the backend services.

pub mod dates;
pub mod models;
pub mod reconcile;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
