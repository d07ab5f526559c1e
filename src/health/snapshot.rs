// src/health/snapshot.rs
use super::{aggregate, ServiceStatus, StatusColor};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Results of one complete probe cycle. Never mutated once built.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub status: StatusColor,
    pub services: Vec<ServiceStatus>,
    /// Start of the cycle.
    pub timestamp: DateTime<Utc>,
    pub cycle: u64,
    pub duration_ms: u64,
}

impl Snapshot {
    pub fn new(
        cycle: u64,
        timestamp: DateTime<Utc>,
        duration_ms: u64,
        services: Vec<ServiceStatus>,
    ) -> Self {
        Self {
            status: aggregate(&services),
            services,
            timestamp,
            cycle,
            duration_ms,
        }
    }

    pub fn service(&self, name: &str) -> Option<&ServiceStatus> {
        self.services.iter().find(|s| s.name == name)
    }
}
