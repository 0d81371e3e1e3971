use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical account role values
pub mod user_role {
    pub const ADMIN: &str = "admin";
    pub const CLIENT: &str = "client";
}

/// UserAccount is a console login, either staff (admin) or a customer (client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session binds an opaque token to an account until it expires
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Principal is the authenticated caller resolved from a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == user_role::ADMIN
    }

    /// Customer id for client principals, None for staff
    pub fn client_customer_id(&self) -> Option<i64> {
        if self.role == user_role::CLIENT { self.customer_id } else { None }
    }
}

/// LoginRequest for authenticating a user
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse returned on successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

/// Request to onboard a customer together with its client login
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub plan_name: String,
    pub monthly_rate: f64,
    pub due_day: i32,
    #[serde(default)]
    pub has_router: bool,
    #[serde(default)]
    pub router_identity: Option<String>,
    #[serde(default = "super::customer::default_wan_interface")]
    pub wan_interface: String,
    #[serde(default = "super::customer::default_lan_interface")]
    pub lan_interface: String,
}

impl CreateAccountRequest {
    pub fn customer_request(&self) -> super::CreateCustomerRequest {
        super::CreateCustomerRequest {
            name: self.name.clone(),
            plan_name: self.plan_name.clone(),
            monthly_rate: self.monthly_rate,
            due_day: self.due_day,
            email: self.email.clone(),
            has_router: self.has_router,
            router_identity: self.router_identity.clone(),
            wan_interface: self.wan_interface.clone(),
            lan_interface: self.lan_interface.clone(),
        }
    }
}

/// Response for a freshly onboarded client
#[derive(Debug, Clone, Serialize)]
pub struct ClientAccount {
    pub account: UserAccount,
    pub customer: super::Customer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router: Option<super::RouterProvision>,
}
