// src/metrics/collector.rs
use crate::health::{ServiceStatus, StatusColor};
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

/// Why a checker produced a synthesized RED result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Error,
    Panic,
    Timeout,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Error => "error",
            FailureKind::Panic => "panic",
            FailureKind::Timeout => "timeout",
        }
    }
}

pub struct MetricsCollector {
    // Cycle metrics
    pub probe_cycles_total: IntCounter,
    pub probe_cycle_duration_seconds: Histogram,
    pub overall_status: IntGauge,

    // Per-service metrics
    pub service_status: IntGaugeVec,
    pub checker_failures_total: IntCounterVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probe_cycles_total =
            IntCounter::new("medic_probe_cycles_total", "Completed probe cycles")?;
        registry.register(Box::new(probe_cycles_total.clone()))?;

        let probe_cycle_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "medic_probe_cycle_duration_seconds",
            "Wall-clock duration of a probe cycle",
        ))?;
        registry.register(Box::new(probe_cycle_duration_seconds.clone()))?;

        let overall_status = IntGauge::new(
            "medic_overall_status",
            "Aggregated status (0=green, 1=orange, 2=red)",
        )?;
        registry.register(Box::new(overall_status.clone()))?;

        let service_status = IntGaugeVec::new(
            Opts::new(
                "medic_service_status",
                "Per-service status (0=green, 1=orange, 2=red)",
            ),
            &["service"],
        )?;
        registry.register(Box::new(service_status.clone()))?;

        let checker_failures_total = IntCounterVec::new(
            Opts::new(
                "medic_checker_failures_total",
                "Checker invocations that errored, panicked or timed out",
            ),
            &["service", "kind"],
        )?;
        registry.register(Box::new(checker_failures_total.clone()))?;

        Ok(Self {
            probe_cycles_total,
            probe_cycle_duration_seconds,
            overall_status,
            service_status,
            checker_failures_total,
        })
    }

    pub fn record_cycle(&self, overall: StatusColor, services: &[ServiceStatus], duration: Duration) {
        self.probe_cycles_total.inc();
        self.probe_cycle_duration_seconds
            .observe(duration.as_secs_f64());
        self.overall_status.set(overall.as_gauge());

        for service in services {
            self.service_status
                .with_label_values(&[&service.name])
                .set(service.status.as_gauge());
        }
    }

    pub fn record_failure(&self, service: &str, kind: FailureKind) {
        self.checker_failures_total
            .with_label_values(&[service, kind.as_str()])
            .inc();
    }
}
