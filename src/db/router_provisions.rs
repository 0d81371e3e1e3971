use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use crate::provisioning;
use super::row_helpers::map_router_provision_row;

const SELECT_PROVISION: &str = r#"
    SELECT rp.*, c.name AS customer_name
    FROM router_provisions rp
    LEFT JOIN customers c ON c.id = rp.customer_id
"#;

pub struct RouterProvisionRepo;

impl RouterProvisionRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<RouterProvision>> {
        let rows = sqlx::query(&format!("{} ORDER BY rp.created_at DESC, rp.id DESC", SELECT_PROVISION))
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_router_provision_row).collect())
    }

    pub async fn get_by_customer(pool: &Pool<Sqlite>, customer_id: i64) -> Result<Option<RouterProvision>> {
        let row = sqlx::query(&format!("{} WHERE rp.customer_id = ?", SELECT_PROVISION))
            .bind(customer_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_router_provision_row))
    }

    /// Return the customer's provision, creating it on first use.
    ///
    /// The UNIQUE key on customer_id decides concurrent first requests: the
    /// losing insert hits a unique violation and re-reads the winner's row, so
    /// every caller sees the same assignment and script.
    pub async fn get_or_create(pool: &Pool<Sqlite>, customer: &Customer, product: &str) -> Result<RouterProvision> {
        if let Some(existing) = Self::get_by_customer(pool, customer.id).await? {
            return Ok(existing);
        }

        let plan = provisioning::plan_for_customer(customer, product)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO router_provisions (customer_id, subnet_cidr, gateway_ip, customer_ip, script, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer.id)
        .bind(&plan.assignment.subnet_cidr)
        .bind(&plan.assignment.gateway_ip)
        .bind(&plan.assignment.customer_ip)
        .bind(&plan.script)
        .bind(Utc::now())
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => tracing::info!(
                "Provisioned router for customer {} ({})",
                customer.id,
                plan.assignment.subnet_cidr
            ),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => tracing::debug!(
                "Router provision for customer {} created concurrently, re-reading",
                customer.id
            ),
            Err(e) => return Err(anyhow::Error::from(e).context("Failed to insert router provision")),
        }

        Self::get_by_customer(pool, customer.id)
            .await?
            .context("Router provision not found after creation")
    }
}
