use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None (router_identity may be stored as '')
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

fn flag(row: &SqliteRow, column: &str) -> bool {
    let v: i32 = row.get(column);
    v != 0
}

/// Map a SQLite row to a Customer struct
pub fn map_customer_row(row: &SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        plan_name: row.get("plan_name"),
        monthly_rate: row.get("monthly_rate"),
        due_day: row.get("due_day"),
        email: row.get("email"),
        active: flag(row, "active"),
        has_router: flag(row, "has_router"),
        router_identity: none_if_empty(row.get("router_identity")),
        wan_interface: row.get("wan_interface"),
        lan_interface: row.get("lan_interface"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a UserAccount struct
pub fn map_user_row(row: &SqliteRow) -> UserAccount {
    UserAccount {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        role: row.get("role"),
        customer_id: row.try_get::<Option<i64>, _>("customer_id").ok().flatten(),
        active: flag(row, "active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Map a SQLite row to an Invoice struct
pub fn map_invoice_row(row: &SqliteRow) -> Invoice {
    Invoice {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        billing_month: row.get("billing_month"),
        amount: row.get("amount"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        paid_at: row.get("paid_at"),
    }
}

pub fn map_payment_gateway_row(row: &SqliteRow) -> PaymentGateway {
    PaymentGateway {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        gateway_name: row.get("gateway_name"),
        account_ref: row.get("account_ref"),
        created_at: row.get("created_at"),
    }
}

pub fn map_transaction_row(row: &SqliteRow) -> Transaction {
    Transaction {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        amount: row.get("amount"),
        method: row.get("method"),
        reference: row.get("reference"),
        created_at: row.get("created_at"),
    }
}

/// Map a SQLite row to a MonitoringEvent struct
pub fn map_event_row(row: &SqliteRow) -> MonitoringEvent {
    MonitoringEvent {
        id: row.get("id"),
        service_name: row.get("service_name"),
        severity: row.get("severity"),
        message: row.get("message"),
        created_at: row.get("created_at"),
        acknowledged: flag(row, "acknowledged"),
        acknowledged_at: row.get("acknowledged_at"),
    }
}

/// Map a SQLite row to a RouterProvision struct (customer_name joined when available)
pub fn map_router_provision_row(row: &SqliteRow) -> RouterProvision {
    RouterProvision {
        id: row.get("id"),
        customer_id: row.get("customer_id"),
        customer_name: row.try_get::<Option<String>, _>("customer_name").ok().flatten(),
        subnet_cidr: row.get("subnet_cidr"),
        gateway_ip: row.get("gateway_ip"),
        customer_ip: row.get("customer_ip"),
        script: row.get("script"),
        created_at: row.get("created_at"),
    }
}
