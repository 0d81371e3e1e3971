use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::AdminUser;
use crate::models::DashboardMetrics;
use crate::AppState;

use super::ApiError;

/// GET /api/metrics
pub async fn dashboard_metrics(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let metrics = state.store.dashboard_metrics().await?;
    Ok(Json(metrics))
}
