use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::*;
use crate::provisioning;
use super::row_helpers::map_customer_row;

pub struct CustomerRepo;

impl CustomerRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Customer>> {
        let rows = sqlx::query("SELECT * FROM customers ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_customer_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT * FROM customers WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_customer_row))
    }

    /// Insert a customer on an existing connection (or transaction) and return its id
    pub async fn insert(conn: &mut SqliteConnection, req: &CreateCustomerRequest) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, plan_name, monthly_rate, due_day, email, active,
                                   has_router, router_identity, wan_interface, lan_interface, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&req.name)
        .bind(&req.plan_name)
        .bind(req.monthly_rate)
        .bind(req.due_day)
        .bind(&req.email)
        .bind(req.has_router)
        .bind(&req.router_identity)
        .bind(&req.wan_interface)
        .bind(&req.lan_interface)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .context("Failed to insert customer")?;
        Ok(result.last_insert_rowid())
    }

    /// Fail when a router-enabled customer id has no point-to-point block.
    /// Callers run this before committing so nothing is left behind.
    pub fn ensure_addressable(has_router: bool, customer_id: i64) -> Result<()> {
        if has_router {
            provisioning::assign_point_to_point_block(customer_id)?;
        }
        Ok(())
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateCustomerRequest) -> Result<Customer> {
        let mut tx = pool.begin().await?;
        let new_id = Self::insert(&mut *tx, req).await?;
        Self::ensure_addressable(req.has_router, new_id)?;
        tx.commit().await.context("Failed to commit customer")?;

        Self::get(pool, new_id)
            .await?
            .context("Customer not found after creation")
    }

    pub async fn update(pool: &Pool<Sqlite>, id: i64, req: &UpdateCustomerRequest) -> Result<Customer> {
        Self::ensure_addressable(req.has_router == Some(true), id)?;
        let result = sqlx::query(
            r#"
            UPDATE customers SET
                plan_name = COALESCE(?, plan_name),
                monthly_rate = COALESCE(?, monthly_rate),
                due_day = COALESCE(?, due_day),
                email = COALESCE(?, email),
                active = COALESCE(?, active),
                has_router = COALESCE(?, has_router),
                router_identity = COALESCE(?, router_identity),
                wan_interface = COALESCE(?, wan_interface),
                lan_interface = COALESCE(?, lan_interface)
            WHERE id = ?
            "#,
        )
        .bind(&req.plan_name)
        .bind(req.monthly_rate)
        .bind(req.due_day)
        .bind(&req.email)
        .bind(req.active)
        .bind(req.has_router)
        .bind(&req.router_identity)
        .bind(&req.wan_interface)
        .bind(&req.lan_interface)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Customer", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Customer not found after update")
    }

    pub async fn update_profile(pool: &Pool<Sqlite>, id: i64, req: &UpdateProfileRequest) -> Result<Customer> {
        Self::update(
            pool,
            id,
            &UpdateCustomerRequest {
                plan_name: Some(req.plan_name.clone()),
                monthly_rate: Some(req.monthly_rate),
                due_day: Some(req.due_day),
                email: Some(req.email.clone()),
                ..Default::default()
            },
        )
        .await
    }

    /// Enable router management and store the CPE settings
    pub async fn update_router_settings(pool: &Pool<Sqlite>, id: i64, req: &RouterSettingsRequest) -> Result<Customer> {
        Self::update(
            pool,
            id,
            &UpdateCustomerRequest {
                has_router: Some(true),
                router_identity: Some(req.router_identity.clone()),
                wan_interface: Some(req.wan_interface.clone()),
                lan_interface: Some(req.lan_interface.clone()),
                ..Default::default()
            },
        )
        .await
    }
}
