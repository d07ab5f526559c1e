// src/checkers/http.rs
use crate::config::HttpCheckConfig;
use crate::health::{Checker, ServiceStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use url::Url;

/// Probes an HTTP dependency with a GET request.
///
/// 2xx is GREEN, or ORANGE when slower than `degraded_after`. Any other
/// status code is RED. Connection errors are returned as errors.
pub struct HttpChecker {
    name: String,
    url: Url,
    client: Client,
    degraded_after: Option<Duration>,
}

impl HttpChecker {
    pub fn new(name: impl Into<String>, url: Url) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            name: name.into(),
            url,
            client,
            degraded_after: None,
        })
    }

    pub fn from_config(config: &HttpCheckConfig) -> Result<Self> {
        let mut checker = Self::new(config.name.clone(), config.url.clone())?;
        checker.degraded_after = config.degraded_after();
        Ok(checker)
    }

    pub fn degraded_after(mut self, latency: Duration) -> Self {
        self.degraded_after = Some(latency);
        self
    }
}

#[async_trait]
impl Checker for HttpChecker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health(&self) -> Result<ServiceStatus> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url.as_str())
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?;
        let elapsed = start.elapsed();
        let code = response.status();

        if !code.is_success() {
            return Ok(ServiceStatus::red(&self.name, format!("HTTP {}", code)));
        }

        let description = format!("HTTP {} in {}ms", code.as_u16(), elapsed.as_millis());
        match self.degraded_after {
            Some(limit) if elapsed > limit => Ok(ServiceStatus::orange(&self.name, description)),
            _ => Ok(ServiceStatus::green(&self.name, description)),
        }
    }
}
