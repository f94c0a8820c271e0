//! Domain models for cement delivery tracking and plant stock reconciliation

mod delivery;
mod plant;
mod report;
mod stock;

pub use delivery::*;
pub use plant::*;
pub use report::*;
pub use stock::*;
