// src/probe/server.rs
use super::runner::ProbeRunner;
use crate::health::{Checker, Snapshot};
use crate::metrics::MetricsCollector;
use arc_swap::ArcSwapOption;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// A background loop refreshes the snapshot; queries never wait on a cycle.
    #[default]
    Scheduled,
    /// Each query runs a fresh cycle, or joins the one already in flight.
    Lazy,
}

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub interval: Duration,
    pub per_check_timeout: Duration,
    pub refresh: RefreshPolicy,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            per_check_timeout: Duration::from_secs(2),
            refresh: RefreshPolicy::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Ready,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("no probe cycle has completed yet")]
    NotReady,

    #[error("a checker named {0:?} is already registered")]
    DuplicateName(String),

    #[error("checker name must not be empty")]
    EmptyName,
}

/// Owns the checker registry and the most recent snapshot.
pub struct ProbeServer {
    settings: ProbeSettings,
    runner: ProbeRunner,
    checkers: RwLock<Vec<Arc<dyn Checker>>>,
    current: ArcSwapOption<Snapshot>,
    // Held for the whole of a cycle so cycles never overlap.
    cycle_lock: Mutex<()>,
    cycles: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ProbeServer {
    pub fn new(settings: ProbeSettings, metrics: Option<Arc<MetricsCollector>>) -> Self {
        let runner = ProbeRunner::new(settings.per_check_timeout, metrics);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            settings,
            runner,
            checkers: RwLock::new(Vec::new()),
            current: ArcSwapOption::empty(),
            cycle_lock: Mutex::new(()),
            cycles: AtomicU64::new(0),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Appends a checker. Names must be unique so the report stays readable.
    ///
    /// Safe to call while serving: a running cycle keeps the registry it
    /// started with and the new checker joins from the next cycle on.
    pub async fn register(&self, checker: Arc<dyn Checker>) -> Result<(), ProbeError> {
        let name = checker.name().to_string();
        if name.is_empty() {
            return Err(ProbeError::EmptyName);
        }

        let mut checkers = self.checkers.write().await;
        if checkers.iter().any(|c| c.name() == name) {
            return Err(ProbeError::DuplicateName(name));
        }
        checkers.push(checker);

        info!("Registered checker: {}", name);
        Ok(())
    }

    pub async fn checkers(&self) -> Vec<String> {
        self.checkers
            .read()
            .await
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn state(&self) -> ProbeState {
        if self.current.load().is_some() {
            ProbeState::Ready
        } else {
            ProbeState::Idle
        }
    }

    /// Latest published snapshot, without waiting on anything.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    /// Runs one cycle over the current registry and publishes the result.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let _cycle = self.cycle_lock.lock().await;
        self.run_locked().await
    }

    async fn run_locked(&self) -> Arc<Snapshot> {
        let checkers = self.checkers.read().await.clone();
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;

        let snapshot = Arc::new(self.runner.run_cycle(cycle, &checkers).await);
        self.current.store(Some(snapshot.clone()));
        snapshot
    }

    /// Answers a health query according to the configured refresh policy.
    pub async fn query(&self) -> Result<Arc<Snapshot>, ProbeError> {
        match self.settings.refresh {
            RefreshPolicy::Scheduled => self.latest().ok_or(ProbeError::NotReady),
            RefreshPolicy::Lazy => Ok(self.refresh_or_join().await),
        }
    }

    async fn refresh_or_join(&self) -> Arc<Snapshot> {
        if let Ok(_cycle) = self.cycle_lock.try_lock() {
            return self.run_locked().await;
        }

        // Someone else is mid-cycle; wait for it and serve what it published.
        let _cycle = self.cycle_lock.lock().await;
        match self.latest() {
            Some(snapshot) => snapshot,
            None => self.run_locked().await,
        }
    }

    /// Refresh loop for the scheduled policy. The first cycle runs immediately.
    pub async fn start(self: Arc<Self>) {
        let mut interval = interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!(
            "Starting probe scheduler with interval: {:?}, per-check timeout: {:?}",
            self.settings.interval,
            self.runner.per_check_timeout()
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let snapshot = self.refresh().await;
                    debug!(cycle = snapshot.cycle, status = %snapshot.status, "Published snapshot");
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Probe scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}
