use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::AdminUser;
use crate::models::*;
use crate::utils::{is_safe_script_text, is_valid_email, length_between};
use crate::AppState;

use super::{created, validate_router_fields, ApiError};

pub(crate) fn validate_plan(plan_name: &str, monthly_rate: f64, due_day: i32) -> Result<(), ApiError> {
    if !length_between(plan_name, 2, 80) {
        return Err(ApiError::bad_request("plan_name must be 2-80 characters"));
    }
    if !monthly_rate.is_finite() || monthly_rate < 0.0 {
        return Err(ApiError::bad_request("monthly_rate must be a non-negative number"));
    }
    if !(1..=31).contains(&due_day) {
        return Err(ApiError::bad_request("due_day must be between 1 and 31"));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("email must be a valid address of 5-255 characters"));
    }
    Ok(())
}

pub(crate) fn validate_new_customer(req: &CreateCustomerRequest) -> Result<(), ApiError> {
    if !length_between(&req.name, 2, 120) {
        return Err(ApiError::bad_request("name must be 2-120 characters"));
    }
    // The name is embedded in the router script comment
    if !is_safe_script_text(&req.name) {
        return Err(ApiError::bad_request(
            "name must not contain quotes, backslashes, '$' or control characters",
        ));
    }
    validate_plan(&req.plan_name, req.monthly_rate, req.due_day)?;
    validate_email(&req.email)?;
    validate_router_fields(
        req.router_identity.as_deref(),
        &req.wan_interface,
        &req.lan_interface,
    )
}

/// Provision the router right away for customers that opted in
pub(crate) async fn provision_if_enabled(
    state: &AppState,
    customer: &Customer,
) -> Result<Option<RouterProvision>, ApiError> {
    if !customer.has_router {
        return Ok(None);
    }
    let provision = state
        .store
        .ensure_router_provision(customer, &state.config.product_name)
        .await?;
    Ok(Some(provision))
}

/// GET /api/customers
pub async fn list_customers(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let customers = state.store.list_customers().await?;
    Ok(Json(customers))
}

/// GET /api/customers/:id
pub async fn get_customer(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, ApiError> {
    let customer = state
        .store
        .get_customer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;
    Ok(Json(customer))
}

/// POST /api/customers
pub async fn create_customer(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(axum::http::StatusCode, Json<Customer>), ApiError> {
    validate_new_customer(&req)?;

    let customer = state.store.create_customer(&req).await?;
    tracing::info!("Customer {} onboarded (id={})", customer.name, customer.id);
    provision_if_enabled(&state, &customer).await?;
    Ok(created(customer))
}

/// PATCH /api/customers/:id
pub async fn update_customer(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    let current = state
        .store
        .get_customer(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;

    validate_plan(
        req.plan_name.as_deref().unwrap_or(&current.plan_name),
        req.monthly_rate.unwrap_or(current.monthly_rate),
        req.due_day.unwrap_or(current.due_day),
    )?;
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    validate_router_fields(
        req.router_identity.as_deref(),
        req.wan_interface.as_deref().unwrap_or(&current.wan_interface),
        req.lan_interface.as_deref().unwrap_or(&current.lan_interface),
    )?;

    let customer = state.store.update_customer(id, &req).await?;
    Ok(Json(customer))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_support::*;

    fn acme() -> serde_json::Value {
        json!({
            "name": "Acme Fiber",
            "plan_name": "Enterprise 1G",
            "monthly_rate": 249.99,
            "due_day": 15,
            "email": "billing@acme.example",
        })
    }

    #[tokio::test]
    async fn test_create_list_update_customer() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;

        let (status, customer) = json(&app, "POST", "/api/customers", Some(&token), Some(acme())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(customer["wan_interface"], "ether1");
        assert_eq!(customer["has_router"], false);
        let id = customer["id"].as_i64().unwrap();

        let (status, list) = json(&app, "GET", "/api/customers", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, updated) = json(
            &app,
            "PATCH",
            &format!("/api/customers/{}", id),
            Some(&token),
            Some(json!({ "monthly_rate": 299.0, "active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["monthly_rate"], 299.0);
        assert_eq!(updated["active"], false);
        assert_eq!(updated["plan_name"], "Enterprise 1G");
    }

    #[tokio::test]
    async fn test_customer_validation() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;

        let mut bad = acme();
        bad["due_day"] = json!(32);
        let (status, _) = json(&app, "POST", "/api/customers", Some(&token), Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut quoted = acme();
        quoted["name"] = json!("Acme \"Fiber\"");
        let (status, body) = json(&app, "POST", "/api/customers", Some(&token), Some(quoted)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("quotes"));

        let mut iface = acme();
        iface["wan_interface"] = json!("ether1 ]");
        let (status, _) = json(&app, "POST", "/api/customers", Some(&token), Some(iface)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_router_onboarding_leaves_no_customer() {
        let (app, state) = test_app().await;
        let token = admin_token(&app).await;
        state
            .store
            .seed_customer(crate::provisioning::CAPACITY - 1, "Last Addressable", false)
            .await
            .unwrap();

        let mut with_router = acme();
        with_router["has_router"] = json!(true);
        for _ in 0..2 {
            let (status, _) =
                json(&app, "POST", "/api/customers", Some(&token), Some(with_router.clone())).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }

        let (_, list) = json(&app, "GET", "/api/customers", Some(&token), None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_404() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        let (status, _) = json(&app, "GET", "/api/customers/42", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = json(
            &app,
            "PATCH",
            "/api/customers/42",
            Some(&token),
            Some(json!({ "active": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
