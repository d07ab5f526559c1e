// src/health/mod.rs
mod aggregate;
mod checker;
mod snapshot;
mod status;

pub use aggregate::aggregate;
pub use checker::Checker;
pub use snapshot::Snapshot;
pub use status::{ServiceStatus, StatusColor};
