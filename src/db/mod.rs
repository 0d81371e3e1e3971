mod customers;
mod events;
mod invoices;
mod metrics;
mod payments;
mod router_provisions;
pub(crate) mod row_helpers;
mod sessions;
mod users;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;
use std::time::Duration;

use crate::models::*;

/// Typed error for "resource not found", downcast by the API error handler
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// Typed error for writes rejected by a uniqueness rule
#[derive(Debug)]
pub struct ConflictError {
    pub message: String,
}

impl ConflictError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ConflictError {}

/// Store handles all database operations, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path))
            .context("Invalid database path")?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Create the staff account when no admin exists yet
    pub async fn bootstrap_admin(&self, password: &str, bcrypt_cost: u32) -> Result<()> {
        if users::UserRepo::count_admins(&self.pool).await? > 0 {
            return Ok(());
        }

        let password_hash = bcrypt::hash(password, bcrypt_cost)
            .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
        users::UserRepo::create(&self.pool, "admin", &password_hash, user_role::ADMIN, None).await?;
        tracing::info!("Created default admin user (username: admin)");
        Ok(())
    }

    // ========== Customer Operations ==========

    pub async fn list_customers(&self) -> Result<Vec<Customer>> {
        customers::CustomerRepo::list(&self.pool).await
    }

    pub async fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        customers::CustomerRepo::get(&self.pool, id).await
    }

    pub async fn create_customer(&self, req: &CreateCustomerRequest) -> Result<Customer> {
        customers::CustomerRepo::create(&self.pool, req).await
    }

    pub async fn update_customer(&self, id: i64, req: &UpdateCustomerRequest) -> Result<Customer> {
        customers::CustomerRepo::update(&self.pool, id, req).await
    }

    pub async fn update_customer_profile(&self, id: i64, req: &UpdateProfileRequest) -> Result<Customer> {
        customers::CustomerRepo::update_profile(&self.pool, id, req).await
    }

    pub async fn update_router_settings(&self, id: i64, req: &RouterSettingsRequest) -> Result<Customer> {
        customers::CustomerRepo::update_router_settings(&self.pool, id, req).await
    }

    // ========== Account Operations ==========

    pub async fn get_user(&self, id: i64) -> Result<Option<UserAccount>> {
        users::UserRepo::get(&self.pool, id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        users::UserRepo::get_by_username(&self.pool, username).await
    }

    pub async fn list_client_accounts(&self) -> Result<Vec<UserAccount>> {
        users::UserRepo::list_clients(&self.pool).await
    }

    /// Create a customer and its client login atomically
    pub async fn create_client_account(
        &self,
        req: &CreateAccountRequest,
        password_hash: &str,
    ) -> Result<(Customer, UserAccount)> {
        let mut tx = self.pool.begin().await?;
        let customer_id = customers::CustomerRepo::insert(&mut *tx, &req.customer_request()).await?;
        customers::CustomerRepo::ensure_addressable(req.has_router, customer_id)?;
        let user_id = users::UserRepo::insert(
            &mut *tx,
            &req.username,
            password_hash,
            user_role::CLIENT,
            Some(customer_id),
        )
        .await?;
        tx.commit().await.context("Failed to commit client account")?;

        let customer = self
            .get_customer(customer_id)
            .await?
            .context("Customer not found after creation")?;
        let account = self
            .get_user(user_id)
            .await?
            .context("User not found after creation")?;
        Ok((customer, account))
    }

    pub async fn toggle_client_account(&self, id: i64) -> Result<UserAccount> {
        users::UserRepo::toggle_client(&self.pool, id).await
    }

    pub async fn delete_client_account(&self, id: i64) -> Result<()> {
        users::UserRepo::delete_client(&self.pool, id).await
    }

    // ========== Session Operations ==========

    pub async fn create_session(&self, user_id: i64, ttl: TimeDelta) -> Result<Session> {
        sessions::SessionRepo::create(&self.pool, user_id, ttl).await
    }

    pub async fn resolve_session(&self, token: &str) -> Result<Option<Principal>> {
        sessions::SessionRepo::resolve(&self.pool, token).await
    }

    pub async fn revoke_session(&self, token: &str) -> Result<()> {
        sessions::SessionRepo::revoke(&self.pool, token).await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        sessions::SessionRepo::purge_expired(&self.pool).await
    }

    // ========== Invoice Operations ==========

    pub async fn list_invoices(&self, status: Option<&str>) -> Result<Vec<Invoice>> {
        invoices::InvoiceRepo::list(&self.pool, status).await
    }

    pub async fn list_customer_invoices(&self, customer_id: i64) -> Result<Vec<Invoice>> {
        invoices::InvoiceRepo::list_for_customer(&self.pool, customer_id).await
    }

    pub async fn create_invoice(&self, req: &CreateInvoiceRequest) -> Result<Invoice> {
        invoices::InvoiceRepo::create(&self.pool, req).await
    }

    pub async fn update_invoice_status(&self, id: i64, status: &str) -> Result<Invoice> {
        invoices::InvoiceRepo::update_status(&self.pool, id, status).await
    }

    // ========== Payment Operations ==========

    pub async fn list_customer_gateways(&self, customer_id: i64) -> Result<Vec<PaymentGateway>> {
        payments::PaymentRepo::list_gateways_for_customer(&self.pool, customer_id).await
    }

    pub async fn create_payment_gateway(
        &self,
        customer_id: i64,
        req: &CreatePaymentGatewayRequest,
    ) -> Result<PaymentGateway> {
        payments::PaymentRepo::create_gateway(&self.pool, customer_id, req).await
    }

    pub async fn list_customer_transactions(&self, customer_id: i64) -> Result<Vec<Transaction>> {
        payments::PaymentRepo::list_transactions_for_customer(&self.pool, customer_id).await
    }

    pub async fn create_transaction(
        &self,
        customer_id: i64,
        req: &CreateTransactionRequest,
    ) -> Result<Transaction> {
        payments::PaymentRepo::create_transaction(&self.pool, customer_id, req).await
    }

    // ========== Monitoring Event Operations ==========

    pub async fn list_events(&self, unacknowledged_only: bool) -> Result<Vec<MonitoringEvent>> {
        events::EventRepo::list(&self.pool, unacknowledged_only).await
    }

    pub async fn create_event(&self, req: &CreateEventRequest) -> Result<MonitoringEvent> {
        events::EventRepo::create(&self.pool, req).await
    }

    pub async fn acknowledge_event(&self, id: i64) -> Result<MonitoringEvent> {
        events::EventRepo::acknowledge(&self.pool, id).await
    }

    // ========== Router Provision Operations ==========

    pub async fn list_router_provisions(&self) -> Result<Vec<RouterProvision>> {
        router_provisions::RouterProvisionRepo::list(&self.pool).await
    }

    pub async fn get_router_provision(&self, customer_id: i64) -> Result<Option<RouterProvision>> {
        router_provisions::RouterProvisionRepo::get_by_customer(&self.pool, customer_id).await
    }

    pub async fn ensure_router_provision(&self, customer: &Customer, product: &str) -> Result<RouterProvision> {
        router_provisions::RouterProvisionRepo::get_or_create(&self.pool, customer, product).await
    }

    // ========== Dashboard ==========

    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        metrics::MetricsRepo::collect(&self.pool).await
    }

    /// Insert a customer row with a fixed id, bypassing validation
    #[cfg(test)]
    pub(crate) async fn seed_customer(&self, id: i64, name: &str, has_router: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, plan_name, monthly_rate, due_day, email, active,
                                   has_router, wan_interface, lan_interface, created_at)
            VALUES (?, ?, 'Seeded', 10.0, 1, 'seed@example.net', 1, ?, 'ether1', 'ether2', ?)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(has_router)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn count_router_provisions(&self, customer_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM router_provisions WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

/// Fresh store on a throw-away SQLite file
#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    let path = std::env::temp_dir().join(format!("netnova-test-{}.db", uuid::Uuid::new_v4()));
    Store::with_pool_size(&path.to_string_lossy(), 8)
        .await
        .expect("test store")
}
