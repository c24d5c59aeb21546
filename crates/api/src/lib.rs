//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Session middleware (cookie or bearer token)
//! - Error to response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use scholaris_core::auth::SessionAuthority;
use scholaris_core::fees::PaymentLedger;
use scholaris_core::provisioning::Provisioner;
use scholaris_shared::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// HTTP-level settings derived from configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Whether the session cookie carries the `Secure` attribute.
    pub secure_cookie: bool,
    /// Upper bound on request handling time.
    pub request_timeout: Duration,
}

impl HttpSettings {
    /// Extracts the HTTP settings from the application config.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cookie_name: config.session.cookie_name.clone(),
            secure_cookie: config.session.secure_cookie,
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session & role authority.
    pub authority: SessionAuthority,
    /// Payment ledger.
    pub ledger: PaymentLedger,
    /// School, principal and student provisioning.
    pub provisioner: Provisioner,
    /// Cookie and timeout settings.
    pub settings: Arc<HttpSettings>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let timeout = state.settings.request_timeout;
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveHeadersLayer::new([AUTHORIZATION, COOKIE, SET_COOKIE]))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
