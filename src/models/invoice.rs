use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical invoice status values
pub mod invoice_status {
    pub const UNPAID: &str = "unpaid";
    pub const PAID: &str = "paid";
    pub const OVERDUE: &str = "overdue";

    pub const ALL: &[&str] = &[UNPAID, PAID, OVERDUE];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub customer_id: i64,
    pub billing_month: String,
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvoiceRequest {
    pub customer_id: i64,
    pub billing_month: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub status: String,
}

/// Query parameters for GET /api/invoices
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceListQuery {
    #[serde(default)]
    pub status: Option<String>,
}
