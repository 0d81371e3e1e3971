use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical monitoring event severity values
pub mod severity {
    pub const INFO: &str = "info";
    pub const WARNING: &str = "warning";
    pub const CRITICAL: &str = "critical";

    pub const ALL: &[&str] = &[INFO, WARNING, CRITICAL];

    pub fn is_valid(severity: &str) -> bool {
        ALL.contains(&severity)
    }
}

/// MonitoringEvent is an alert raised against a network service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringEvent {
    pub id: i64,
    pub service_name: String,
    pub severity: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub acknowledged: bool,
    pub acknowledged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    pub service_name: String,
    pub severity: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    #[serde(default)]
    pub unacknowledged_only: bool,
}
