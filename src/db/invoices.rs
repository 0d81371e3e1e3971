use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_invoice_row;

pub struct InvoiceRepo;

impl InvoiceRepo {
    pub async fn list(pool: &Pool<Sqlite>, status: Option<&str>) -> Result<Vec<Invoice>> {
        let rows = match status {
            Some(status) => {
                sqlx::query("SELECT * FROM invoices WHERE status = ? ORDER BY created_at DESC, id DESC")
                    .bind(status)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM invoices ORDER BY created_at DESC, id DESC")
                    .fetch_all(pool)
                    .await?
            }
        };
        Ok(rows.iter().map(map_invoice_row).collect())
    }

    pub async fn list_for_customer(pool: &Pool<Sqlite>, customer_id: i64) -> Result<Vec<Invoice>> {
        let rows = sqlx::query("SELECT * FROM invoices WHERE customer_id = ? ORDER BY created_at DESC, id DESC")
            .bind(customer_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_invoice_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Invoice>> {
        let row = sqlx::query("SELECT * FROM invoices WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_invoice_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateInvoiceRequest) -> Result<Invoice> {
        let result = sqlx::query(
            r#"
            INSERT INTO invoices (customer_id, billing_month, amount, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(req.customer_id)
        .bind(&req.billing_month)
        .bind(req.amount)
        .bind(invoice_status::UNPAID)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let new_id = result.last_insert_rowid();
        Self::get(pool, new_id)
            .await?
            .context("Invoice not found after creation")
    }

    /// Set the status; paid_at is stamped for "paid" and cleared otherwise
    pub async fn update_status(pool: &Pool<Sqlite>, id: i64, status: &str) -> Result<Invoice> {
        let paid_at = (status == invoice_status::PAID).then(Utc::now);
        let result = sqlx::query("UPDATE invoices SET status = ?, paid_at = ? WHERE id = ?")
            .bind(status)
            .bind(paid_at)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Invoice", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Invoice not found after update")
    }
}
