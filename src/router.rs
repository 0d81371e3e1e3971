use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::AppState;

const HSTS: &str = "max-age=63072000; includeSubDomains; preload";

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        // Dashboard
        .route("/api/metrics", get(handlers::metrics::dashboard_metrics))
        // Customer routes
        .route(
            "/api/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/api/customers/:id",
            get(handlers::customers::get_customer).patch(handlers::customers::update_customer),
        )
        // Router provisioning routes
        .route(
            "/api/customers/:id/router-provision",
            get(handlers::router_configs::get_router_provision),
        )
        .route(
            "/customers/:id/router-config",
            get(handlers::router_configs::download_router_config),
        )
        .route(
            "/api/router-provisions",
            get(handlers::router_configs::list_router_provisions),
        )
        // Invoice routes
        .route(
            "/api/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route(
            "/api/invoices/:id",
            axum::routing::patch(handlers::invoices::update_invoice),
        )
        // Monitoring event routes
        .route(
            "/api/events",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route("/api/events/:id/ack", post(handlers::events::acknowledge_event))
        // Client account routes
        .route(
            "/api/accounts",
            get(handlers::accounts::list_accounts).post(handlers::accounts::create_account),
        )
        .route("/api/accounts/:id/toggle", post(handlers::accounts::toggle_account))
        .route(
            "/api/accounts/:id",
            axum::routing::delete(handlers::accounts::delete_account),
        )
        // Client portal routes
        .route("/api/client/portal", get(handlers::client::portal))
        .route("/api/client/profile", put(handlers::client::update_profile))
        .route("/api/client/router", put(handlers::client::update_router))
        .route("/api/client/router-script", get(handlers::client::router_script))
        .route(
            "/api/client/payment-gateways",
            post(handlers::client::add_payment_gateway),
        )
        .route("/api/client/transactions", post(handlers::client::add_transaction))
        // Static assets
        .nest_service("/static", ServeDir::new(static_dir))
        // Add state and middleware
        .layer(middleware::from_fn_with_state(state.clone(), security_headers))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn security_headers(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if let Ok(request_id) = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()) {
        headers.insert("x-request-id", request_id);
    }
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    if state.config.is_production() {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS));
    }
    response
}
