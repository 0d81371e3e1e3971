use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::TimeDelta;
use std::sync::Arc;

use crate::db::Store;
use crate::handlers::ErrorResponse;
use crate::models::{Principal, Session};
use crate::AppState;

/// Cookie carrying the session token for browser clients
pub const SESSION_COOKIE: &str = "netnova_session";

/// Session persistence as seen by the HTTP layer.
/// Tokens are opaque; only the store knows what they map to.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn open(&self, user_id: i64, ttl: TimeDelta) -> anyhow::Result<Session>;
    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Principal>>;
    async fn revoke(&self, token: &str) -> anyhow::Result<()>;
}

#[async_trait::async_trait]
impl SessionStore for Store {
    async fn open(&self, user_id: i64, ttl: TimeDelta) -> anyhow::Result<Session> {
        self.create_session(user_id, ttl).await
    }

    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Principal>> {
        self.resolve_session(token).await
    }

    async fn revoke(&self, token: &str) -> anyhow::Result<()> {
        self.revoke_session(token).await
    }
}

/// Extractor that resolves the session token into the caller's principal.
///
/// Add `auth: AuthUser` to a handler's parameters to require any signed-in
/// user; use [`AdminUser`] or [`ClientUser`] to also require a role.
pub struct AuthUser {
    pub principal: Principal,
    pub token: String,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts)?;

        let principal = state
            .sessions
            .resolve(&token)
            .await
            .map_err(|e| {
                tracing::error!("Session lookup failed: {}", e);
                AuthError::Unavailable
            })?
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser { principal, token })
    }
}

/// Authorization header first, then the session cookie
fn session_token(parts: &Parts) -> Result<String, AuthError> {
    if let Some(auth_header) = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    {
        return auth_header
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or(AuthError::InvalidToken);
    }

    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingToken)
}

/// Staff principal
pub struct AdminUser(pub Principal);

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if !auth.principal.is_admin() {
            return Err(AuthError::Forbidden("Admin access required"));
        }
        Ok(AdminUser(auth.principal))
    }
}

/// Customer principal with its linked customer id
pub struct ClientUser {
    pub principal: Principal,
    pub customer_id: i64,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for ClientUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        let customer_id = auth
            .principal
            .client_customer_id()
            .ok_or(AuthError::Forbidden("Client access required"))?;
        Ok(ClientUser {
            principal: auth.principal,
            customer_id,
        })
    }
}

pub enum AuthError {
    MissingToken,
    InvalidToken,
    Forbidden(&'static str),
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing session token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired session"),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AuthError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "Session store unavailable"),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
