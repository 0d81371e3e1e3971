use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment method a client keeps on file (e.g. a mobile-money wallet)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: i64,
    pub customer_id: i64,
    pub gateway_name: String,
    pub account_ref: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentGatewayRequest {
    pub gateway_name: String,
    pub account_ref: String,
}

/// Payment a client reports against their account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub customer_id: i64,
    pub amount: f64,
    pub method: String,
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub method: String,
    pub reference: String,
}
