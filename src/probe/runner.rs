// src/probe/runner.rs
use crate::health::{Checker, ServiceStatus, Snapshot};
use crate::metrics::{FailureKind, MetricsCollector};
use chrono::Utc;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tokio::time::{timeout, timeout_at, Duration};
use tracing::{debug, warn};

pub(crate) const TIMED_OUT: &str = "timed out";

// Slack given to a task after its own timeout before the join gives up on it.
const JOIN_GRACE: Duration = Duration::from_millis(50);

enum Outcome {
    Reported(ServiceStatus),
    Failed(String),
    TimedOut,
}

/// Runs every checker once, concurrently, each under its own timeout.
pub struct ProbeRunner {
    per_check_timeout: Duration,
    metrics: Option<Arc<MetricsCollector>>,
}

impl ProbeRunner {
    pub fn new(per_check_timeout: Duration, metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self {
            per_check_timeout,
            metrics,
        }
    }

    pub fn per_check_timeout(&self) -> Duration {
        self.per_check_timeout
    }

    /// Results come back in the order of `checkers`, whatever order they finish in.
    pub async fn run_cycle(&self, cycle: u64, checkers: &[Arc<dyn Checker>]) -> Snapshot {
        let timestamp = Utc::now();
        let start = Instant::now();

        let mut tasks = Vec::with_capacity(checkers.len());
        for checker in checkers {
            let checker = checker.clone();
            let limit = self.per_check_timeout;
            // The timeout lives inside the task so the checker future is
            // dropped on expiry instead of running on in the background.
            tasks.push(tokio::spawn(async move {
                match timeout(limit, checker.health()).await {
                    Ok(Ok(status)) => Outcome::Reported(status),
                    Ok(Err(e)) => Outcome::Failed(format!("{e:#}")),
                    Err(_) => Outcome::TimedOut,
                }
            }));
        }

        // A checker that blocks its thread never sees its in-task timeout,
        // so the join is bounded as well.
        let deadline = tokio::time::Instant::now() + self.per_check_timeout + JOIN_GRACE;
        let results = futures::future::join_all(tasks.into_iter().map(|handle| async move {
            let abort = handle.abort_handle();
            match timeout_at(deadline, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.abort();
                    Ok(Outcome::TimedOut)
                }
            }
        }))
        .await;

        let services: Vec<ServiceStatus> = checkers
            .iter()
            .zip(results)
            .map(|(checker, result)| self.settle(checker.name(), result))
            .collect();

        let elapsed = start.elapsed();
        let snapshot = Snapshot::new(cycle, timestamp, elapsed.as_millis() as u64, services);

        if let Some(metrics) = &self.metrics {
            metrics.record_cycle(snapshot.status, &snapshot.services, elapsed);
        }

        debug!(
            cycle,
            status = %snapshot.status,
            services = snapshot.services.len(),
            "Probe cycle complete in {:?}",
            elapsed
        );

        snapshot
    }

    fn settle(&self, name: &str, result: Result<Outcome, JoinError>) -> ServiceStatus {
        let (kind, description) = match result {
            Ok(Outcome::Reported(mut status)) => {
                if status.name.is_empty() {
                    status.name = name.to_string();
                }
                return status;
            }
            Ok(Outcome::Failed(error)) => (FailureKind::Error, error),
            Ok(Outcome::TimedOut) => (FailureKind::Timeout, TIMED_OUT.to_string()),
            Err(e) if e.is_panic() => (
                FailureKind::Panic,
                format!("panicked: {}", panic_message(e.into_panic())),
            ),
            Err(e) => (FailureKind::Error, e.to_string()),
        };

        warn!(checker = name, kind = kind.as_str(), "Health check failed: {}", description);

        if let Some(metrics) = &self.metrics {
            metrics.record_failure(name, kind);
        }

        ServiceStatus::red(name, description)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
