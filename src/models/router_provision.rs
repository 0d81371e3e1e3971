use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RouterProvision is the persisted assignment and script for one customer.
/// Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterProvision {
    pub id: i64,
    pub customer_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    pub subnet_cidr: String,
    pub gateway_ip: String,
    pub customer_ip: String,
    pub script: String,
    pub created_at: DateTime<Utc>,
}
