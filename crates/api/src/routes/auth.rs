//! Authentication routes: login, logout and the current session.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use crate::middleware::client::Client;
use crate::middleware::session::{AuthSession, presented_token, removal_cookie, session_cookie};
use crate::{ApiError, AppState};
use scholaris_shared::auth::{LoginRequest, LoginResponse, SessionInfo};

/// Routes reachable without a session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Routes behind the session middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// POST /auth/login - Authenticate and open a session.
async fn login(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (token, session) = state
        .authority
        .authenticate(&payload.email, &payload.password, &client)
        .await?;

    info!(user_id = %session.user_id, role = %session.role, "User logged in");

    let jar = jar.add(session_cookie(&state.settings, &token));
    let body = LoginResponse {
        token: token.expose().to_owned(),
        role: session.role.to_string(),
        school_id: session.school_id,
        expires_at: session.expires_at,
    };
    Ok((jar, Json(body)))
}

/// POST /auth/logout - End the presented session. Always succeeds for
/// unknown or missing tokens.
async fn logout(
    State(state): State<AppState>,
    Client(client): Client,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = presented_token(&headers, &jar, &state.settings.cookie_name) {
        state.authority.terminate(&token, &client).await?;
    }

    let jar = jar.add(removal_cookie(&state.settings));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// GET /auth/me - The current session.
async fn me(auth: AuthSession) -> Json<SessionInfo> {
    let session = auth.session;
    Json(SessionInfo {
        user_id: session.user_id,
        role: session.role.to_string(),
        school_id: session.school_id,
        created_at: session.created_at,
        expires_at: session.expires_at,
    })
}
