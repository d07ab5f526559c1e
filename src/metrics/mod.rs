// src/metrics/mod.rs
mod collector;

pub use collector::{FailureKind, MetricsCollector, MetricsRegistry};
