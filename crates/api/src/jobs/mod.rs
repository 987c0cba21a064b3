//! Background job scheduler and job implementations.

mod pin_upkeep;
mod scheduler;

pub use pin_upkeep::PinUpkeepJob;
pub use scheduler::{Job, JobScheduler};
