//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::session::session_middleware};

pub mod auth;
pub mod health;
pub mod payments;
pub mod schools;

/// Creates the API router; every route except health, login and logout
/// requires a live session.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(schools::routes())
        .merge(payments::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
