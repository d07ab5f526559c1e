// src/health/aggregate.rs
use super::{ServiceStatus, StatusColor};

/// Worst status wins. No services means nothing is known to be wrong.
pub fn aggregate(statuses: &[ServiceStatus]) -> StatusColor {
    statuses
        .iter()
        .map(|s| s.status)
        .max()
        .unwrap_or(StatusColor::Green)
}
