use anyhow::Result;
use sqlx::{Pool, Sqlite};

use crate::models::{invoice_status, severity, DashboardMetrics};

pub struct MetricsRepo;

impl MetricsRepo {
    pub async fn collect(pool: &Pool<Sqlite>) -> Result<DashboardMetrics> {
        let (customer_count, mrr): (i64, f64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(monthly_rate), 0.0) FROM customers")
                .fetch_one(pool)
                .await?;

        let (unpaid,): (f64,) =
            sqlx::query_as("SELECT COALESCE(SUM(amount), 0.0) FROM invoices WHERE status != ?")
                .bind(invoice_status::PAID)
                .fetch_one(pool)
                .await?;

        let (critical_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM monitoring_events WHERE severity = ? AND acknowledged = 0",
        )
        .bind(severity::CRITICAL)
        .fetch_one(pool)
        .await?;

        Ok(DashboardMetrics {
            customer_count,
            mrr: round_cents(mrr),
            unpaid: round_cents(unpaid),
            critical_count,
        })
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
