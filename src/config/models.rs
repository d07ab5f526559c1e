// src/config/models.rs
use crate::probe::{ProbeSettings, RefreshPolicy};
use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub probe: ProbeConfig,
    pub metrics: MetricsConfig,
    pub http_checks: Vec<HttpCheckConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: ([0, 0, 0, 0], 3000).into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub interval_secs: u64,
    pub timeout_ms: u64,
    pub refresh: RefreshPolicy,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            timeout_ms: 2000,
            refresh: RefreshPolicy::Scheduled,
        }
    }
}

impl ProbeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            interval: self.interval(),
            per_check_timeout: self.timeout(),
            refresh: self.refresh,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9090,
            path: "/metrics".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpCheckConfig {
    pub name: String,
    pub url: Url,
    /// Successful responses slower than this are reported ORANGE.
    #[serde(default)]
    pub degraded_after_ms: Option<u64>,
}

impl HttpCheckConfig {
    pub fn degraded_after(&self) -> Option<Duration> {
        self.degraded_after_ms.map(Duration::from_millis)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.probe.interval_secs == 0 {
            bail!("probe.interval_secs must be greater than zero");
        }
        if self.probe.timeout_ms == 0 {
            bail!("probe.timeout_ms must be greater than zero");
        }
        if self.metrics.path.is_empty() {
            bail!("metrics.path must not be empty");
        }
        if self.metrics.enabled && !self.metrics.path.starts_with('/') {
            bail!("metrics.path must start with '/'");
        }

        let mut seen = HashSet::new();
        for check in &self.http_checks {
            if check.name.trim().is_empty() {
                bail!("http_checks entries need a non-empty name");
            }
            if !seen.insert(check.name.as_str()) {
                bail!("duplicate http check name: {}", check.name);
            }
        }

        Ok(())
    }
}
