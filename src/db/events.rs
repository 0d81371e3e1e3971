use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_event_row;

pub struct EventRepo;

impl EventRepo {
    pub async fn list(pool: &Pool<Sqlite>, unacknowledged_only: bool) -> Result<Vec<MonitoringEvent>> {
        let sql = if unacknowledged_only {
            "SELECT * FROM monitoring_events WHERE acknowledged = 0 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT * FROM monitoring_events ORDER BY created_at DESC, id DESC"
        };
        let rows = sqlx::query(sql).fetch_all(pool).await?;
        Ok(rows.iter().map(map_event_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<MonitoringEvent>> {
        let row = sqlx::query("SELECT * FROM monitoring_events WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.as_ref().map(map_event_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &CreateEventRequest) -> Result<MonitoringEvent> {
        let result = sqlx::query(
            r#"
            INSERT INTO monitoring_events (service_name, severity, message, created_at, acknowledged)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(&req.service_name)
        .bind(&req.severity)
        .bind(&req.message)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        let new_id = result.last_insert_rowid();
        Self::get(pool, new_id)
            .await?
            .context("Event not found after creation")
    }

    pub async fn acknowledge(pool: &Pool<Sqlite>, id: i64) -> Result<MonitoringEvent> {
        let result = sqlx::query(
            "UPDATE monitoring_events SET acknowledged = 1, acknowledged_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(super::NotFoundError::new("Event", &id.to_string()).into());
        }

        Self::get(pool, id)
            .await?
            .context("Event not found after acknowledge")
    }
}
