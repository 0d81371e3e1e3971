use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::{map_payment_gateway_row, map_transaction_row};

pub struct PaymentRepo;

impl PaymentRepo {
    pub async fn list_gateways_for_customer(pool: &Pool<Sqlite>, customer_id: i64) -> Result<Vec<PaymentGateway>> {
        let rows = sqlx::query(
            "SELECT * FROM payment_gateways WHERE customer_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(map_payment_gateway_row).collect())
    }

    pub async fn get_gateway(pool: &Pool<Sqlite>, id: i64) -> Result<Option<PaymentGateway>> {
        let row = sqlx::query("SELECT * FROM payment_gateways WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_payment_gateway_row))
    }

    pub async fn create_gateway(
        pool: &Pool<Sqlite>,
        customer_id: i64,
        req: &CreatePaymentGatewayRequest,
    ) -> Result<PaymentGateway> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_gateways (customer_id, gateway_name, account_ref, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(customer_id)
        .bind(&req.gateway_name)
        .bind(&req.account_ref)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let new_id = result.last_insert_rowid();
        Self::get_gateway(pool, new_id)
            .await?
            .context("Payment gateway not found after creation")
    }

    pub async fn list_transactions_for_customer(pool: &Pool<Sqlite>, customer_id: i64) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            "SELECT * FROM transactions WHERE customer_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.iter().map(map_transaction_row).collect())
    }

    pub async fn get_transaction(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Transaction>> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_transaction_row))
    }

    pub async fn create_transaction(
        pool: &Pool<Sqlite>,
        customer_id: i64,
        req: &CreateTransactionRequest,
    ) -> Result<Transaction> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (customer_id, amount, method, reference, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(customer_id)
        .bind(req.amount)
        .bind(&req.method)
        .bind(&req.reference)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let new_id = result.last_insert_rowid();
        Self::get_transaction(pool, new_id)
            .await?
            .context("Transaction not found after creation")
    }
}
