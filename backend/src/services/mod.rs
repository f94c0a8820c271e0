//! Business logic services for cement delivery tracking and plant stock

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};

pub mod delivery;
pub mod ledger;
pub mod plant;
pub mod reconciliation;

pub use delivery::DeliveryService;
pub use ledger::LedgerService;
pub use plant::PlantService;
pub use reconciliation::ReconciliationService;

/// Current time at the precision PostgreSQL stores
pub(crate) fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
