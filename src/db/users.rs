use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::models::{user_role, UserAccount};
use super::row_helpers::map_user_row;

/// User account database operations
pub struct UserRepo;

impl UserRepo {
    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<UserAccount>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn get_by_username(pool: &Pool<Sqlite>, username: &str) -> Result<Option<UserAccount>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn list_clients(pool: &Pool<Sqlite>) -> Result<Vec<UserAccount>> {
        let rows = sqlx::query("SELECT * FROM users WHERE role = ? ORDER BY created_at DESC, id DESC")
            .bind(user_role::CLIENT)
            .fetch_all(pool)
            .await?;
        Ok(rows.iter().map(map_user_row).collect())
    }

    pub async fn count_admins(pool: &Pool<Sqlite>) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(user_role::ADMIN)
            .fetch_one(pool)
            .await?;
        Ok(count.0)
    }

    /// Insert an account and return its id. A taken username surfaces as ConflictError.
    pub async fn insert(
        conn: &mut SqliteConnection,
        username: &str,
        password_hash: &str,
        role: &str,
        customer_id: Option<i64>,
    ) -> Result<i64> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, customer_id, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(customer_id)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(super::ConflictError::new(format!("username '{}' already exists", username)).into())
            }
            Err(e) => Err(anyhow::Error::from(e).context("Failed to insert user")),
        }
    }

    pub async fn create(
        pool: &Pool<Sqlite>,
        username: &str,
        password_hash: &str,
        role: &str,
        customer_id: Option<i64>,
    ) -> Result<UserAccount> {
        let mut conn = pool.acquire().await?;
        let new_id = Self::insert(&mut *conn, username, password_hash, role, customer_id).await?;
        drop(conn);
        Self::get(pool, new_id)
            .await?
            .context("User not found after creation")
    }

    /// Flip the active flag on a client account
    pub async fn toggle_client(pool: &Pool<Sqlite>, id: i64) -> Result<UserAccount> {
        let result = sqlx::query(
            "UPDATE users SET active = CASE active WHEN 0 THEN 1 ELSE 0 END, updated_at = ? WHERE id = ? AND role = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .bind(user_role::CLIENT)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Client account", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("User not found after update")
    }

    pub async fn delete_client(pool: &Pool<Sqlite>, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND role = ?")
            .bind(id)
            .bind(user_role::CLIENT)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Client account", &id.to_string()).into());
        }
        Ok(())
    }
}
