// tests/health_endpoint_tests.rs
use anyhow::{bail, Result};
use async_trait::async_trait;
use hyper::{Body, Method, Request, StatusCode};
use medic::{
    health::{Checker, ServiceStatus, StatusColor},
    probe::{ProbeServer, ProbeSettings, RefreshPolicy},
    server::{HealthHandler, ServerBuilder},
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceExt;

struct Clock;

#[async_trait]
impl Checker for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    async fn health(&self) -> Result<ServiceStatus> {
        Ok(ServiceStatus::green("clock", "12:00:00"))
    }
}

struct BrokenDb;

#[async_trait]
impl Checker for BrokenDb {
    fn name(&self) -> &str {
        "db"
    }

    async fn health(&self) -> Result<ServiceStatus> {
        bail!("connection refused")
    }
}

struct Sleepy {
    name: String,
    delay: Duration,
    color: StatusColor,
}

impl Sleepy {
    fn new(name: &str, delay_ms: u64, color: StatusColor) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
            color,
        })
    }
}

#[async_trait]
impl Checker for Sleepy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health(&self) -> Result<ServiceStatus> {
        tokio::time::sleep(self.delay).await;
        Ok(ServiceStatus::new(self.name.clone(), self.color, "done"))
    }
}

fn probe(refresh: RefreshPolicy, timeout_ms: u64) -> Arc<ProbeServer> {
    Arc::new(ProbeServer::new(
        ProbeSettings {
            interval: Duration::from_secs(60),
            per_check_timeout: Duration::from_millis(timeout_ms),
            refresh,
        },
        None,
    ))
}

async fn get(handler: &HealthHandler, path: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap();
    let response = handler.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn single_green_checker_reports_green() {
    let probe = probe(RefreshPolicy::Scheduled, 1_000);
    probe.register(Arc::new(Clock)).await.unwrap();
    probe.refresh().await;

    let (status, body) = get(&HealthHandler::new(probe), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "GREEN");
    assert_eq!(body["services"].as_array().unwrap().len(), 1);
    assert_eq!(body["services"][0]["name"], "clock");
    assert_eq!(body["services"][0]["status"], "GREEN");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn failing_checker_turns_overall_red() {
    let probe = probe(RefreshPolicy::Scheduled, 1_000);
    probe.register(Arc::new(Clock)).await.unwrap();
    probe.register(Arc::new(BrokenDb)).await.unwrap();
    probe.refresh().await;

    let (status, body) = get(&HealthHandler::new(probe), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "RED");
    assert_eq!(body["services"][0]["name"], "clock");
    assert_eq!(body["services"][0]["status"], "GREEN");
    assert_eq!(body["services"][1]["name"], "db");
    assert_eq!(body["services"][1]["status"], "RED");
    assert_eq!(body["services"][1]["description"], "connection refused");
}

#[tokio::test]
async fn slow_checker_times_out_without_holding_the_query() {
    let probe = probe(RefreshPolicy::Lazy, 200);
    probe
        .register(Sleepy::new("sleepy", 10_000, StatusColor::Green))
        .await
        .unwrap();
    let handler = HealthHandler::new(probe);

    let start = Instant::now();
    let (status, body) = get(&handler, "/health").await;

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["services"][0]["name"], "sleepy");
    assert_eq!(body["services"][0]["status"], "RED");
    assert_eq!(body["services"][0]["description"], "timed out");
}

#[tokio::test]
async fn query_before_first_cycle_is_not_ready() {
    let probe = probe(RefreshPolicy::Scheduled, 1_000);
    probe.register(Arc::new(Clock)).await.unwrap();

    let (status, body) = get(&HealthHandler::new(probe), "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "UNKNOWN");
    assert!(body.get("services").is_none());
}

#[tokio::test]
async fn order_is_registration_order_whatever_finishes_first() {
    let probe = probe(RefreshPolicy::Scheduled, 2_000);
    let delays = [120, 10, 80, 0, 50];
    for (i, delay) in delays.iter().enumerate() {
        probe
            .register(Sleepy::new(&format!("svc-{i}"), *delay, StatusColor::Green))
            .await
            .unwrap();
    }

    let snapshot = probe.refresh().await;
    let names: Vec<_> = snapshot.services.iter().map(|s| s.name.clone()).collect();

    assert_eq!(names, ["svc-0", "svc-1", "svc-2", "svc-3", "svc-4"]);
}

#[tokio::test]
async fn repeated_cycles_report_the_same_services() {
    let probe = probe(RefreshPolicy::Scheduled, 1_000);
    probe.register(Arc::new(Clock)).await.unwrap();
    probe.register(Arc::new(BrokenDb)).await.unwrap();
    probe
        .register(Sleepy::new("cache", 5, StatusColor::Orange))
        .await
        .unwrap();

    let first = probe.refresh().await;
    let second = probe.refresh().await;

    assert_eq!(first.services, second.services);
    assert_eq!(first.status, second.status);
    assert_ne!(first.cycle, second.cycle);
}

#[tokio::test]
async fn orange_is_degraded_but_still_200() {
    let probe = probe(RefreshPolicy::Lazy, 1_000);
    probe.register(Arc::new(Clock)).await.unwrap();
    probe
        .register(Sleepy::new("replica", 0, StatusColor::Orange))
        .await
        .unwrap();

    let (status, body) = get(&HealthHandler::new(probe), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ORANGE");
}

#[tokio::test]
async fn dashboard_and_unknown_routes() {
    let handler = HealthHandler::new(probe(RefreshPolicy::Scheduled, 1_000));

    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = handler.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = hyper::body::to_bytes(response.into_body()).await.unwrap();
    assert!(String::from_utf8_lossy(&html).contains("/health"));

    let req = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let response = handler.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = handler.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn serves_over_tcp_and_stops_on_shutdown() {
    let probe = probe(RefreshPolicy::Scheduled, 1_000);
    probe.register(Arc::new(Clock)).await.unwrap();
    probe.refresh().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(
        ServerBuilder::new(addr)
            .with_handler(HealthHandler::new(probe))
            .serve_listener(listener, async move {
                let _ = stop_rx.await;
            }),
    );

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "GREEN");

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
