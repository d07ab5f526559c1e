//! demos/probe_demo.rs
//! Run: cargo run --example probe_demo
//! Then open http://localhost:3000/ or curl http://localhost:3000/health

use anyhow::Result;
use async_trait::async_trait;
use medic::{
    health::{Checker, ServiceStatus, StatusColor},
    probe::{ProbeServer, ProbeSettings},
    server::{HealthHandler, ServerBuilder},
};
use rand::seq::SliceRandom;
use std::net::SocketAddr;
use std::sync::Arc;

/// Always healthy; reports the current time.
struct ClockChecker;

#[async_trait]
impl Checker for ClockChecker {
    fn name(&self) -> &str {
        "clock"
    }

    async fn health(&self) -> Result<ServiceStatus> {
        let now = chrono::Local::now().format("%H:%M:%S").to_string();
        Ok(ServiceStatus::green("clock", now))
    }
}

/// Picks a random colour on every call.
struct FlakyChecker;

#[async_trait]
impl Checker for FlakyChecker {
    fn name(&self) -> &str {
        "rng"
    }

    async fn health(&self) -> Result<ServiceStatus> {
        let status = *[StatusColor::Green, StatusColor::Orange, StatusColor::Red]
            .choose(&mut rand::thread_rng())
            .unwrap_or(&StatusColor::Green);
        Ok(ServiceStatus::new("rng", status, format!("Rolled {status}")))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medic=debug".parse()?),
        )
        .init();

    let probe = Arc::new(ProbeServer::new(ProbeSettings::default(), None));
    probe.register(Arc::new(ClockChecker)).await?;
    probe.register(Arc::new(FlakyChecker)).await?;

    tokio::spawn(probe.clone().start());

    let addr: SocketAddr = ([0, 0, 0, 0], 3000).into();
    ServerBuilder::new(addr)
        .with_handler(HealthHandler::new(probe))
        .serve()
        .await
}
