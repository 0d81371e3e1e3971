use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::auth::AdminUser;
use crate::models::*;
use crate::utils::length_between;
use crate::AppState;

use super::{created, ApiError};

/// GET /api/events?unacknowledged_only=true
pub async fn list_events(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<MonitoringEvent>>, ApiError> {
    let events = state.store.list_events(query.unacknowledged_only).await?;
    Ok(Json(events))
}

/// POST /api/events
pub async fn create_event(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(axum::http::StatusCode, Json<MonitoringEvent>), ApiError> {
    if !length_between(&req.service_name, 2, 120) {
        return Err(ApiError::bad_request("service_name must be 2-120 characters"));
    }
    if !severity::is_valid(&req.severity) {
        return Err(ApiError::bad_request(format!(
            "severity must be one of: {}",
            severity::ALL.join(", ")
        )));
    }
    if !length_between(&req.message, 2, 500) {
        return Err(ApiError::bad_request("message must be 2-500 characters"));
    }

    let event = state.store.create_event(&req).await?;
    if event.severity == severity::CRITICAL {
        tracing::warn!("Critical event on {}: {}", event.service_name, event.message);
    }
    Ok(created(event))
}

/// POST /api/events/:id/ack
pub async fn acknowledge_event(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MonitoringEvent>, ApiError> {
    let event = state.store.acknowledge_event(id).await?;
    Ok(Json(event))
}
