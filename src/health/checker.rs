// src/health/checker.rs
use super::ServiceStatus;
use anyhow::Result;
use async_trait::async_trait;

/// Anything that can report on one aspect of the system's health.
///
/// Implementations should finish in bounded time and must stay cancel-safe:
/// the probe runner drops the `health` future once the per-check timeout
/// expires. Returning `Err` or panicking marks the service RED.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Name used for synthesized results when `health` fails or times out.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn health(&self) -> Result<ServiceStatus>;
}
