// src/health/status.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a service's health. Ordered so that `max` picks the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusColor {
    Green,
    Orange,
    Red,
}

impl StatusColor {
    /// Gauge value exported to prometheus (0=green, 1=orange, 2=red).
    pub fn as_gauge(self) -> i64 {
        match self {
            StatusColor::Green => 0,
            StatusColor::Orange => 1,
            StatusColor::Red => 2,
        }
    }

    /// HTTP status code used when this is the overall verdict.
    /// Orange is degraded but still serving, so it maps to 200.
    pub fn http_status(self) -> u16 {
        match self {
            StatusColor::Green | StatusColor::Orange => 200,
            StatusColor::Red => 503,
        }
    }
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusColor::Green => "GREEN",
            StatusColor::Orange => "ORANGE",
            StatusColor::Red => "RED",
        };
        f.write_str(s)
    }
}

/// Result of evaluating one checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub name: String,
    pub status: StatusColor,
    #[serde(default)]
    pub description: String,
    /// Optional breakdown of the service's own components. Passed through as is.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub subservices: Vec<ServiceStatus>,
}

impl ServiceStatus {
    pub fn new(
        name: impl Into<String>,
        status: StatusColor,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            description: description.into(),
            subservices: Vec::new(),
        }
    }

    pub fn green(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, StatusColor::Green, description)
    }

    pub fn orange(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, StatusColor::Orange, description)
    }

    pub fn red(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, StatusColor::Red, description)
    }

    pub fn with_subservices(mut self, subservices: Vec<ServiceStatus>) -> Self {
        self.subservices = subservices;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_are_ordered_by_severity() {
        assert!(StatusColor::Green < StatusColor::Orange);
        assert!(StatusColor::Orange < StatusColor::Red);
        assert_eq!(
            [StatusColor::Orange, StatusColor::Red, StatusColor::Green]
                .into_iter()
                .max(),
            Some(StatusColor::Red)
        );
    }

    #[test]
    fn serializes_uppercase_and_skips_empty_subservices() {
        let status = ServiceStatus::orange("db", "slow replica");
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "name": "db",
                "status": "ORANGE",
                "description": "slow replica",
            })
        );
    }

    #[test]
    fn nested_subservices_are_serialized() {
        let status = ServiceStatus::red("external-api", "auth failing")
            .with_subservices(vec![ServiceStatus::red("auth", "token refresh failed")]);
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["subservices"][0]["name"], "auth");
        assert_eq!(json["subservices"][0]["status"], "RED");
    }

    #[test]
    fn http_mapping_keeps_degraded_services_up() {
        assert_eq!(StatusColor::Green.http_status(), 200);
        assert_eq!(StatusColor::Orange.http_status(), 200);
        assert_eq!(StatusColor::Red.http_status(), 503);
        assert_eq!(StatusColor::Red.to_string(), "RED");
    }
}
