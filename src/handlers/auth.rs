use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::TimeDelta;
use std::sync::Arc;

use crate::auth::{AuthUser, SESSION_COOKIE};
use crate::models::{LoginRequest, LoginResponse, Principal};
use crate::AppState;

use super::{ApiError, MessageResponse};

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let user = state
        .store
        .get_user_by_username(&req.username)
        .await
        .map_err(|_| ApiError::internal("database error"))?
        .filter(|u| u.active)
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    let password = req.password.clone();
    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(|_| ApiError::internal("password verification error"))?;

    if !valid {
        tracing::info!("Rejected login for {}", req.username);
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let session = state
        .sessions
        .open(user.id, TimeDelta::hours(state.config.session_ttl_hours))
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.is_production());

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token: session.token,
            username: user.username,
            role: user.role,
            expires_at: session.expires_at,
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    state.sessions.revoke(&auth.token).await?;
    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        MessageResponse::new("logged out"),
    ))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<Principal> {
    Json(auth.principal)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::handlers::test_support::*;

    #[tokio::test]
    async fn test_login_me_logout() {
        let (app, _) = test_app().await;

        let (status, headers, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "username": "admin", "password": ADMIN_PASSWORD })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let cookie = headers.get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.starts_with("netnova_session="));
        assert!(cookie.contains("HttpOnly"));

        let token = admin_token(&app).await;
        let (status, me) = json(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "admin");
        assert_eq!(me["role"], "admin");

        let (status, _) = json(&app, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = json(&app, "GET", "/api/auth/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let (app, _) = test_app().await;
        let (status, body) = json(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "username": "admin", "password": "wrong" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid credentials");
    }

    #[tokio::test]
    async fn test_missing_and_unknown_tokens() {
        let (app, _) = test_app().await;
        let (status, _) = json(&app, "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = json(&app, "GET", "/api/auth/me", Some("not-a-session"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_cookie_session_is_accepted() {
        let (app, _) = test_app().await;
        let token = admin_token(&app).await;

        let request = axum::http::Request::builder()
            .uri("/api/auth/me")
            .header("cookie", format!("netnova_session={}", token))
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
