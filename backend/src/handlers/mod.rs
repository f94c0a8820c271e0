//! HTTP handlers

pub mod delivery;
pub mod health;
pub mod plant;
pub mod report;
pub mod stock;

pub use delivery::*;
pub use health::*;
pub use plant::*;
pub use report::*;
pub use stock::*;
