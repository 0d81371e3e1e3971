use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::auth::AdminUser;
use crate::models::RouterProvision;
use crate::AppState;

use super::{plain_text, ApiError};

/// Load the customer and return its provision, allocating one on first use
async fn provision_for(state: &AppState, customer_id: i64) -> Result<RouterProvision, ApiError> {
    let customer = state
        .store
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Customer"))?;

    if !customer.has_router {
        return Err(ApiError::bad_request("Router not configured"));
    }

    let provision = state
        .store
        .ensure_router_provision(&customer, &state.config.product_name)
        .await?;
    Ok(provision)
}

/// GET /api/customers/:id/router-provision
pub async fn get_router_provision(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RouterProvision>, ApiError> {
    let provision = provision_for(&state, id).await?;
    Ok(Json(provision))
}

/// GET /customers/:id/router-config
///
/// Same provision as the JSON endpoint, rendered as a downloadable script.
pub async fn download_router_config(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    let provision = provision_for(&state, id).await?;
    Ok(plain_text(provision.script))
}

/// GET /api/router-provisions
pub async fn list_router_provisions(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RouterProvision>>, ApiError> {
    let provisions = state.store.list_router_provisions().await?;
    Ok(Json(provisions))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_support::*;

    async fn create_customer(app: &axum::Router, token: &str, name: &str, has_router: bool) -> i64 {
        let (status, body) = json(
            app,
            "POST",
            "/api/customers",
            Some(token),
            Some(json!({
                "name": name,
                "plan_name": "Home 300",
                "monthly_rate": 59.0,
                "due_day": 5,
                "email": "noc@example.net",
                "has_router": has_router,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_provision_is_stable_across_requests() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        let id = create_customer(&app, &token, "Harbor Cafe", true).await;

        let uri = format!("/api/customers/{}/router-provision", id);
        let (status, first) = json(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = json(&app, "GET", &uri, Some(&token), None).await;
        assert_eq!(first, second);
        assert_eq!(first["subnet_cidr"], format!("10.20.10.{}/30", id * 2));
        assert_eq!(first["customer_name"], "Harbor Cafe");

        let (status, headers, script) =
            send(&app, "GET", &format!("/customers/{}/router-config", id), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers["content-type"].to_str().unwrap().starts_with("text/plain"));
        assert_eq!(script, first["script"].as_str().unwrap());
        assert!(script.contains("/system identity set name=\"NetNova-CPE-"));
    }

    #[tokio::test]
    async fn test_router_disabled_and_missing_customer() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        let id = create_customer(&app, &token, "Quiet Library", false).await;

        let (status, body) = json(
            &app,
            "GET",
            &format!("/api/customers/{}/router-provision", id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Router not configured");

        let (status, _, _) = send(&app, "GET", "/customers/999/router-config", Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_router_provisions() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;
        create_customer(&app, &token, "North Depot", true).await;
        create_customer(&app, &token, "South Depot", true).await;
        create_customer(&app, &token, "No Router Inc", false).await;

        let (status, list) = json(&app, "GET", "/api/router-provisions", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_ne!(list[0]["customer_ip"], list[1]["customer_ip"]);
    }

    #[tokio::test]
    async fn test_allocation_errors_map_to_status() {
        let (app, state) = test_app().await;
        let token = admin_token(&app).await;
        let capacity = crate::provisioning::CAPACITY;
        state.store.seed_customer(capacity, "Beyond The Plan", true).await.unwrap();
        state.store.seed_customer(-1, "Negative Id", true).await.unwrap();

        let expected = format!(
            "customer id {} exceeds router address capacity ({} links)",
            capacity, capacity
        );
        let (status, body) = json(
            &app,
            "GET",
            &format!("/api/customers/{}/router-provision", capacity),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], expected);

        let (status, _, text) = send(
            &app,
            "GET",
            &format!("/customers/{}/router-config", capacity),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], expected);

        let (status, body) = json(&app, "GET", "/api/customers/-1/router-provision", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid customer id: -1");

        assert_eq!(state.store.count_router_provisions(capacity).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_requires_admin() {
        let (app, _) = test_app().await;
        let (status, _, _) = send(&app, "GET", "/customers/1/router-config", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
