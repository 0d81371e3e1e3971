use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::AdminUser;
use crate::models::*;
use crate::utils::length_between;
use crate::AppState;

use super::customers::{provision_if_enabled, validate_new_customer};
use super::{created, ApiError};

fn validate_credentials(username: &str, password: &str) -> Result<(), ApiError> {
    let username_ok = length_between(username, 3, 50)
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');
    if !username_ok {
        return Err(ApiError::bad_request(
            "username must be 3-50 characters of letters, digits, '.', '_' or '-'",
        ));
    }
    if !length_between(password, 6, 128) {
        return Err(ApiError::bad_request("password must be 6-128 characters"));
    }
    Ok(())
}

/// GET /api/accounts
pub async fn list_accounts(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserAccount>>, ApiError> {
    let accounts = state.store.list_client_accounts().await?;
    Ok(Json(accounts))
}

/// POST /api/accounts
///
/// Onboards a customer together with its portal login. When the customer
/// has a router the provision is created as part of onboarding.
pub async fn create_account(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(axum::http::StatusCode, Json<ClientAccount>), ApiError> {
    validate_credentials(&req.username, &req.password)?;
    validate_new_customer(&req.customer_request())?;

    let cost = state.config.bcrypt_cost;
    let password = req.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    let (customer, account) = state.store.create_client_account(&req, &password_hash).await?;
    tracing::info!("Client account {} created for customer {}", account.username, customer.id);

    let router = provision_if_enabled(&state, &customer).await?;
    Ok(created(ClientAccount {
        account,
        customer,
        router,
    }))
}

/// POST /api/accounts/:id/toggle
pub async fn toggle_account(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserAccount>, ApiError> {
    let account = state.store.toggle_client_account(id).await?;
    Ok(Json(account))
}

/// DELETE /api/accounts/:id
pub async fn delete_account(
    _admin: AdminUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.store.delete_client_account(id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
