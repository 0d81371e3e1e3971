use anyhow::Result;
use chrono::{TimeDelta, Utc};
use sqlx::{Pool, Row, Sqlite};

use crate::models::{Principal, Session};

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &Pool<Sqlite>, user_id: i64, ttl: TimeDelta) -> Result<Session> {
        let now = Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.created_at)
            .bind(session.expires_at)
            .execute(pool)
            .await?;

        Ok(session)
    }

    /// Resolve a token to its principal. Expired sessions are removed on sight;
    /// sessions of disabled accounts resolve to nothing.
    pub async fn resolve(pool: &Pool<Sqlite>, token: &str) -> Result<Option<Principal>> {
        let row = sqlx::query(
            r#"
            SELECT s.expires_at, u.id AS user_id, u.username, u.role, u.customer_id, u.active
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: chrono::DateTime<Utc> = row.get("expires_at");
        if expires_at <= Utc::now() {
            Self::revoke(pool, token).await?;
            return Ok(None);
        }

        let active: i32 = row.get("active");
        if active == 0 {
            return Ok(None);
        }

        Ok(Some(Principal {
            user_id: row.get("user_id"),
            username: row.get("username"),
            role: row.get("role"),
            customer_id: row.try_get::<Option<i64>, _>("customer_id").ok().flatten(),
        }))
    }

    pub async fn revoke(pool: &Pool<Sqlite>, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn purge_expired(pool: &Pool<Sqlite>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
