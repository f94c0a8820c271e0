//! Shared types and models for the cement tracking platform
//!
//! This crate contains the pure domain logic shared between the backend,
//! the browser entry form (via WASM), and tests: delivery financial
//! calculation, plant balance rules, the ledger sign rule and stock
//! reconciliation.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
