use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::auth::AdminUser;
use crate::models::*;
use crate::utils::is_valid_billing_month;
use crate::AppState;

use super::{created, ApiError};

fn validate_status(status: &str) -> Result<(), ApiError> {
    if !invoice_status::is_valid(status) {
        return Err(ApiError::bad_request(format!(
            "status must be one of: {}",
            invoice_status::ALL.join(", ")
        )));
    }
    Ok(())
}

/// GET /api/invoices?status=unpaid
pub async fn list_invoices(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    let status = query.status.as_deref().filter(|s| !s.is_empty());
    if let Some(status) = status {
        validate_status(status)?;
    }
    let invoices = state.store.list_invoices(status).await?;
    Ok(Json(invoices))
}

/// POST /api/invoices
pub async fn create_invoice(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(axum::http::StatusCode, Json<Invoice>), ApiError> {
    if !is_valid_billing_month(&req.billing_month) {
        return Err(ApiError::bad_request("billing_month must be in YYYY-MM format"));
    }
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err(ApiError::bad_request("amount must be a non-negative number"));
    }
    if state.store.get_customer(req.customer_id).await?.is_none() {
        return Err(ApiError::not_found("Customer"));
    }

    let invoice = state.store.create_invoice(&req).await?;
    Ok(created(invoice))
}

/// PATCH /api/invoices/:id
pub async fn update_invoice(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>, ApiError> {
    validate_status(&req.status)?;
    let invoice = state.store.update_invoice_status(id, &req.status).await?;
    Ok(Json(invoice))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_support::*;

    async fn customer(app: &axum::Router, token: &str) -> i64 {
        let (_, body) = json(
            app,
            "POST",
            "/api/customers",
            Some(token),
            Some(json!({
                "name": "Riverside Clinic",
                "plan_name": "Business 500",
                "monthly_rate": 120.0,
                "due_day": 1,
                "email": "admin@riverside.example",
            })),
        )
        .await;
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_invoice_lifecycle() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        let customer_id = customer(&app, &token).await;

        let (status, invoice) = json(
            &app,
            "POST",
            "/api/invoices",
            Some(&token),
            Some(json!({ "customer_id": customer_id, "billing_month": "2026-10", "amount": 120.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(invoice["status"], "unpaid");
        assert!(invoice["paid_at"].is_null());
        let id = invoice["id"].as_i64().unwrap();

        let (status, paid) = json(
            &app,
            "PATCH",
            &format!("/api/invoices/{}", id),
            Some(&token),
            Some(json!({ "status": "paid" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["status"], "paid");
        assert!(!paid["paid_at"].is_null());

        let (_, unpaid) = json(&app, "GET", "/api/invoices?status=unpaid", Some(&token), None).await;
        assert!(unpaid.as_array().unwrap().is_empty());
        let (_, all) = json(&app, "GET", "/api/invoices", Some(&token), None).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invoice_validation() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        let customer_id = customer(&app, &token).await;

        let (status, _) = json(
            &app,
            "POST",
            "/api/invoices",
            Some(&token),
            Some(json!({ "customer_id": customer_id, "billing_month": "2026-13", "amount": 10.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = json(
            &app,
            "POST",
            "/api/invoices",
            Some(&token),
            Some(json!({ "customer_id": 9999, "billing_month": "2026-10", "amount": 10.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = json(&app, "GET", "/api/invoices?status=void", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = json(
            &app,
            "PATCH",
            "/api/invoices/77",
            Some(&token),
            Some(json!({ "status": "paid" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
