use axum::{extract::State, response::Response, Json};
use std::sync::Arc;

use crate::auth::ClientUser;
use crate::models::*;
use crate::utils::length_between;
use crate::AppState;

use super::customers::{validate_email, validate_plan};
use super::{created, plain_text, validate_router_fields, ApiError};

async fn own_customer(state: &AppState, customer_id: i64) -> Result<Customer, ApiError> {
    state
        .store
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))
}

/// GET /api/client/portal
pub async fn portal(
    client: ClientUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClientPortal>, ApiError> {
    let customer = own_customer(&state, client.customer_id).await?;
    let invoices = state.store.list_customer_invoices(customer.id).await?;
    let transactions = state.store.list_customer_transactions(customer.id).await?;
    let gateways = state.store.list_customer_gateways(customer.id).await?;
    let router = state.store.get_router_provision(customer.id).await?;
    Ok(Json(ClientPortal {
        customer,
        invoices,
        transactions,
        gateways,
        router,
    }))
}

/// PUT /api/client/profile
pub async fn update_profile(
    client: ClientUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Customer>, ApiError> {
    validate_plan(&req.plan_name, req.monthly_rate, req.due_day)?;
    validate_email(&req.email)?;

    let customer = state
        .store
        .update_customer_profile(client.customer_id, &req)
        .await?;
    tracing::info!("{} updated the profile of customer {}", client.principal.username, customer.id);
    Ok(Json(customer))
}

/// POST /api/client/payment-gateways
pub async fn add_payment_gateway(
    client: ClientUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePaymentGatewayRequest>,
) -> Result<(axum::http::StatusCode, Json<PaymentGateway>), ApiError> {
    if !length_between(&req.gateway_name, 2, 80) {
        return Err(ApiError::bad_request("gateway_name must be 2-80 characters"));
    }
    if !length_between(&req.account_ref, 2, 120) {
        return Err(ApiError::bad_request("account_ref must be 2-120 characters"));
    }

    let gateway = state
        .store
        .create_payment_gateway(client.customer_id, &req)
        .await?;
    tracing::info!(
        "{} added payment gateway {} for customer {}",
        client.principal.username,
        gateway.gateway_name,
        gateway.customer_id
    );
    Ok(created(gateway))
}

/// POST /api/client/transactions
pub async fn add_transaction(
    client: ClientUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTransactionRequest>,
) -> Result<(axum::http::StatusCode, Json<Transaction>), ApiError> {
    if !req.amount.is_finite() || req.amount <= 0.0 {
        return Err(ApiError::bad_request("amount must be a positive number"));
    }
    if !length_between(&req.method, 2, 40) {
        return Err(ApiError::bad_request("method must be 2-40 characters"));
    }
    if !length_between(&req.reference, 2, 120) {
        return Err(ApiError::bad_request("reference must be 2-120 characters"));
    }

    let transaction = state
        .store
        .create_transaction(client.customer_id, &req)
        .await?;
    tracing::info!(
        "{} recorded transaction {} for customer {}",
        client.principal.username,
        transaction.reference,
        transaction.customer_id
    );
    Ok(created(transaction))
}

/// PUT /api/client/router
///
/// Turns the router on for the caller's customer and provisions it. An
/// existing provision is kept as-is.
pub async fn update_router(
    client: ClientUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RouterSettingsRequest>,
) -> Result<Json<RouterProvision>, ApiError> {
    validate_router_fields(
        Some(&req.router_identity),
        &req.wan_interface,
        &req.lan_interface,
    )?;

    let customer = state
        .store
        .update_router_settings(client.customer_id, &req)
        .await?;
    let provision = state
        .store
        .ensure_router_provision(&customer, &state.config.product_name)
        .await?;
    tracing::info!(
        "{} configured router {} for customer {}",
        client.principal.username,
        req.router_identity,
        customer.id
    );
    Ok(Json(provision))
}

/// GET /api/client/router-script
pub async fn router_script(
    client: ClientUser,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let customer = own_customer(&state, client.customer_id).await?;
    if !customer.has_router {
        return Err(ApiError::bad_request("Router not configured"));
    }

    let provision = state
        .store
        .ensure_router_provision(&customer, &state.config.product_name)
        .await?;
    Ok(plain_text(provision.script))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_support::*;

    async fn client_token(app: &axum::Router) -> (String, i64) {
        let admin = admin_token(app).await;
        let (status, body) = json(
            app,
            "POST",
            "/api/accounts",
            Some(&admin),
            Some(json!({
                "name": "Elm Court Residence",
                "email": "home@elm.example",
                "username": "elmcourt",
                "password": "router-pass",
                "plan_name": "Home 100",
                "monthly_rate": 35.0,
                "due_day": 28,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let customer_id = body["customer"]["id"].as_i64().unwrap();
        (login(app, "elmcourt", "router-pass").await, customer_id)
    }

    #[tokio::test]
    async fn test_router_script_requires_router() {
        let (app, _) = test_app().await;
        let (token, _) = client_token(&app).await;

        let (status, _, body) = send(&app, "GET", "/api/client/router-script", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Router not configured"));
    }

    #[tokio::test]
    async fn test_enable_router_then_download() {
        let (app, _) = test_app().await;
        let (token, customer_id) = client_token(&app).await;

        let (status, provision) = json(
            &app,
            "PUT",
            "/api/client/router",
            Some(&token),
            Some(json!({ "router_identity": "ElmCourt-hAP", "wan_interface": "ether1", "lan_interface": "bridge" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", provision);
        assert_eq!(provision["customer_id"], customer_id);

        let (status, _, script) = send(&app, "GET", "/api/client/router-script", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(script, provision["script"].as_str().unwrap());
        assert!(script.starts_with("/system identity set name=\"ElmCourt-hAP\""));
        assert!(script.contains("[find default-name=bridge] name=bridge"));

        // Later settings changes do not rewrite an existing provision
        let (_, again) = json(
            &app,
            "PUT",
            "/api/client/router",
            Some(&token),
            Some(json!({ "router_identity": "Renamed", "wan_interface": "ether1", "lan_interface": "ether2" })),
        )
        .await;
        assert_eq!(again["script"], provision["script"]);

        let (_, portal) = json(&app, "GET", "/api/client/portal", Some(&token), None).await;
        assert_eq!(portal["customer"]["router_identity"], "Renamed");
        assert_eq!(portal["router"]["id"], provision["id"]);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let (app, _) = test_app().await;
        let (token, _) = client_token(&app).await;

        let (status, customer) = json(
            &app,
            "PUT",
            "/api/client/profile",
            Some(&token),
            Some(json!({ "plan_name": "Home 500", "monthly_rate": 55.0, "due_day": 3, "email": "new@elm.example" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(customer["plan_name"], "Home 500");
        assert_eq!(customer["email"], "new@elm.example");

        let (status, _) = json(
            &app,
            "PUT",
            "/api/client/profile",
            Some(&token),
            Some(json!({ "plan_name": "Home 500", "monthly_rate": -1.0, "due_day": 3, "email": "new@elm.example" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_payments_show_in_portal() {
        let (app, _) = test_app().await;
        let (token, customer_id) = client_token(&app).await;

        let (status, gateway) = json(
            &app,
            "POST",
            "/api/client/payment-gateways",
            Some(&token),
            Some(json!({ "gateway_name": "M-Pesa", "account_ref": "254700000001" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", gateway);
        assert_eq!(gateway["customer_id"], customer_id);

        for reference in ["MPX-1001", "MPX-1002"] {
            let (status, _) = json(
                &app,
                "POST",
                "/api/client/transactions",
                Some(&token),
                Some(json!({ "amount": 35.0, "method": "M-Pesa", "reference": reference })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, portal) = json(&app, "GET", "/api/client/portal", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(portal["gateways"][0]["gateway_name"], "M-Pesa");
        let transactions = portal["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0]["reference"], "MPX-1002");
        assert!(portal.get("router").is_none());
    }

    #[tokio::test]
    async fn test_payment_validation() {
        let (app, _) = test_app().await;
        let (token, _) = client_token(&app).await;

        let (status, _) = json(
            &app,
            "POST",
            "/api/client/transactions",
            Some(&token),
            Some(json!({ "amount": 0.0, "method": "Card", "reference": "REF-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = json(
            &app,
            "POST",
            "/api/client/payment-gateways",
            Some(&token),
            Some(json!({ "gateway_name": "X", "account_ref": "acct-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let admin = admin_token(&app).await;
        let (status, _) = json(
            &app,
            "POST",
            "/api/client/transactions",
            Some(&admin),
            Some(json!({ "amount": 10.0, "method": "Card", "reference": "REF-2" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, portal) = json(&app, "GET", "/api/client/portal", Some(&token), None).await;
        assert!(portal["transactions"].as_array().unwrap().is_empty());
        assert!(portal["gateways"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_admin_is_not_a_client() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        let (status, body) = json(&app, "GET", "/api/client/portal", Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Client access required");
    }

    #[tokio::test]
    async fn test_router_settings_are_validated() {
        let (app, _) = test_app().await;
        let (token, _) = client_token(&app).await;
        let (status, _) = json(
            &app,
            "PUT",
            "/api/client/router",
            Some(&token),
            Some(json!({ "router_identity": "hAP", "wan_interface": "ether1", "lan_interface": "ether1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
