// src/server/handler.rs
use crate::probe::{ProbeError, ProbeServer};
use crate::server::dashboard::DASHBOARD_HTML;
use hyper::header::{ALLOW, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tower::Service;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Serialize)]
struct NotReadyBody<'a> {
    status: &'static str,
    message: &'a str,
}

/// Serves `GET /health` and the dashboard at `GET /`.
#[derive(Clone)]
pub struct HealthHandler {
    probe: Arc<ProbeServer>,
}

impl HealthHandler {
    pub fn new(probe: Arc<ProbeServer>) -> Self {
        Self { probe }
    }

    pub async fn handle(&self, req: Request<Body>) -> Result<Response<Body>, BoxError> {
        let path = req.uri().path();
        if path != "/health" && path != "/" {
            return text(StatusCode::NOT_FOUND, "Not Found");
        }
        if req.method() != Method::GET {
            let response = Response::builder()
                .status(StatusCode::METHOD_NOT_ALLOWED)
                .header(ALLOW, "GET")
                .body(Body::from("Method Not Allowed"))?;
            return Ok(response);
        }

        if path == "/" {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(CONTENT_TYPE, "text/html; charset=utf-8")
                .body(Body::from(DASHBOARD_HTML))?;
            return Ok(response);
        }

        self.health().await
    }

    async fn health(&self) -> Result<Response<Body>, BoxError> {
        match self.probe.query().await {
            Ok(snapshot) => {
                let status = StatusCode::from_u16(snapshot.status.http_status())?;
                json(status, serde_json::to_vec(snapshot.as_ref())?)
            }
            Err(e @ ProbeError::NotReady) => {
                let message = e.to_string();
                let body = NotReadyBody {
                    status: "UNKNOWN",
                    message: &message,
                };
                json(StatusCode::SERVICE_UNAVAILABLE, serde_json::to_vec(&body)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn json(status: StatusCode, body: Vec<u8>) -> Result<Response<Body>, BoxError> {
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(CACHE_CONTROL, "no-store")
        .body(Body::from(body))?;
    Ok(response)
}

fn text(status: StatusCode, body: &'static str) -> Result<Response<Body>, BoxError> {
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))?;
    Ok(response)
}

impl Service<Request<Body>> for HealthHandler {
    type Response = Response<Body>;
    type Error = BoxError;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move {
            handler.handle(req).await.map_err(|e| {
                tracing::error!(%e, "health handler error");
                e
            })
        })
    }
}
