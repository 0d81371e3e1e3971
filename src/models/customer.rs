use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Invoice, PaymentGateway, RouterProvision, Transaction};

/// Customer is a billed subscriber, optionally with a managed CPE router
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub plan_name: String,
    pub monthly_rate: f64,
    pub due_day: i32,
    pub email: String,
    pub active: bool,
    pub has_router: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router_identity: Option<String>,
    pub wan_interface: String,
    pub lan_interface: String,
    pub created_at: DateTime<Utc>,
}

/// CreateCustomerRequest for onboarding a customer
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub plan_name: String,
    pub monthly_rate: f64,
    pub due_day: i32,
    pub email: String,
    #[serde(default)]
    pub has_router: bool,
    #[serde(default)]
    pub router_identity: Option<String>,
    #[serde(default = "default_wan_interface")]
    pub wan_interface: String,
    #[serde(default = "default_lan_interface")]
    pub lan_interface: String,
}

/// UpdateCustomerRequest - every field is optional, absent fields are left as-is
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCustomerRequest {
    #[serde(default)]
    pub plan_name: Option<String>,
    #[serde(default)]
    pub monthly_rate: Option<f64>,
    #[serde(default)]
    pub due_day: Option<i32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub has_router: Option<bool>,
    #[serde(default)]
    pub router_identity: Option<String>,
    #[serde(default)]
    pub wan_interface: Option<String>,
    #[serde(default)]
    pub lan_interface: Option<String>,
}

/// Profile fields a client may change on their own customer record
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    pub plan_name: String,
    pub monthly_rate: f64,
    pub due_day: i32,
    pub email: String,
}

/// Router settings submitted from the client portal
#[derive(Debug, Clone, Deserialize)]
pub struct RouterSettingsRequest {
    pub router_identity: String,
    #[serde(default = "default_wan_interface")]
    pub wan_interface: String,
    #[serde(default = "default_lan_interface")]
    pub lan_interface: String,
}

/// Everything the client portal shows for the signed-in customer
#[derive(Debug, Clone, Serialize)]
pub struct ClientPortal {
    pub customer: Customer,
    pub invoices: Vec<Invoice>,
    pub transactions: Vec<Transaction>,
    pub gateways: Vec<PaymentGateway>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router: Option<RouterProvision>,
}

pub(crate) fn default_wan_interface() -> String {
    crate::provisioning::DEFAULT_WAN_INTERFACE.to_string()
}

pub(crate) fn default_lan_interface() -> String {
    crate::provisioning::DEFAULT_LAN_INTERFACE.to_string()
}
