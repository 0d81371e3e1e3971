pub mod accounts;
pub mod auth;
pub mod client;
pub mod customers;
pub mod events;
pub mod invoices;
pub mod metrics;
pub mod router_configs;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::provisioning::AllocationError;

/// Error response - {"error": "message"}
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: format!("{} not found", resource),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: msg.into(),
        }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Typed errors first (no fragile string matching)
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return Self::not_found(&nf.resource);
        }
        if let Some(conflict) = err.downcast_ref::<crate::db::ConflictError>() {
            return Self::conflict(conflict.to_string());
        }
        if let Some(alloc) = err.downcast_ref::<AllocationError>() {
            return match alloc {
                AllocationError::InvalidCustomerId(_) => Self::bad_request(alloc.to_string()),
                AllocationError::CapacityExceeded { .. } => {
                    tracing::error!("Router address pool exhausted: {}", alloc);
                    Self::internal(alloc.to_string())
                }
            };
        }
        tracing::error!("Unhandled error: {:#}", err);
        Self::internal("Internal server error")
    }
}

/// Message response for simple status messages
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(msg: impl Into<String>) -> Json<Self> {
        Json(Self { message: msg.into() })
    }
}

/// Response helper: return 201 Created with JSON body
pub fn created<T: Serialize>(item: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(item))
}

/// Response helper: plain-text body (router scripts)
pub fn plain_text(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// Healthcheck endpoint, always 200 OK
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "netnova",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Shared validation for the customer fields that reach the router script
pub(crate) fn validate_router_fields(
    router_identity: Option<&str>,
    wan_interface: &str,
    lan_interface: &str,
) -> Result<(), ApiError> {
    if let Some(identity) = router_identity {
        if !crate::utils::length_between(identity, 0, 64) || !crate::utils::is_safe_script_text(identity) {
            return Err(ApiError::bad_request(
                "router_identity must be at most 64 characters without quotes, backslashes, '$' or control characters",
            ));
        }
    }
    for (field, value) in [("wan_interface", wan_interface), ("lan_interface", lan_interface)] {
        if !crate::utils::is_valid_interface_name(value) {
            return Err(ApiError::bad_request(format!(
                "{} must be 1-64 characters of letters, digits, '-', '.' or '_'",
                field
            )));
        }
    }
    if wan_interface == lan_interface {
        return Err(ApiError::bad_request("wan_interface and lan_interface must differ"));
    }
    Ok(())
}
