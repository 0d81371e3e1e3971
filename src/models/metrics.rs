use serde::Serialize;

/// Headline numbers for the operations dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub customer_count: i64,
    pub mrr: f64,
    pub unpaid: f64,
    pub critical_count: i64,
}
