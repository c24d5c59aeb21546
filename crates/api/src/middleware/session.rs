//! Session middleware for protected routes.
//!
//! The token is taken from `Authorization: Bearer <token>` first, then from
//! the session cookie. Resolving it slides the session's idle window.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use scholaris_core::auth::{AuthorizationError, Session, SessionToken};

use crate::{ApiError, AppState, HttpSettings};

/// The resolved session of the current request.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session record.
    pub session: Session,
    /// Token the client presented.
    pub token: SessionToken,
}

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Finds the presented token, header before cookie.
pub fn presented_token(headers: &HeaderMap, jar: &CookieJar, cookie_name: &str) -> Option<SessionToken> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::trim)
        .filter(|t| !t.is_empty());

    match bearer {
        Some(token) => Some(SessionToken::from_client(token)),
        None => jar
            .get(cookie_name)
            .map(Cookie::value)
            .filter(|v| !v.is_empty())
            .map(SessionToken::from_client),
    }
}

/// Builds the HttpOnly session cookie.
#[must_use]
pub fn session_cookie(settings: &HttpSettings, token: &SessionToken) -> Cookie<'static> {
    Cookie::build((settings.cookie_name.clone(), token.expose().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(settings.secure_cookie)
        .build()
}

/// An already expired cookie that makes the client drop the session cookie.
#[must_use]
pub fn removal_cookie(settings: &HttpSettings) -> Cookie<'static> {
    let mut cookie = Cookie::build(settings.cookie_name.clone())
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

/// Session middleware that resolves the presented token.
///
/// Stores an [`AuthSession`] in the request extensions for handlers.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = presented_token(request.headers(), &jar, &state.settings.cookie_name) else {
        return ApiError::from(AuthorizationError::Unauthenticated).into_response();
    };

    match state.authority.resolve(&token).await {
        Ok(session) => {
            request
                .extensions_mut()
                .insert(AuthSession { session, token });
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AuthorizationError::Unauthenticated.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::COOKIE;

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_wins_over_cookie() {
        let map = headers(&[
            (AUTHORIZATION, "Bearer from-header"),
            (COOKIE, "sid=from-cookie"),
        ]);
        let jar = CookieJar::from_headers(&map);
        let token = presented_token(&map, &jar, "sid").unwrap();
        assert_eq!(token.expose(), "from-header");
    }

    #[test]
    fn test_cookie_used_without_header() {
        let map = headers(&[(COOKIE, "other=x; sid=from-cookie")]);
        let jar = CookieJar::from_headers(&map);
        let token = presented_token(&map, &jar, "sid").unwrap();
        assert_eq!(token.expose(), "from-cookie");
    }

    #[test]
    fn test_missing_or_blank_token() {
        let map = headers(&[(AUTHORIZATION, "Bearer   ")]);
        let jar = CookieJar::from_headers(&map);
        assert!(presented_token(&map, &jar, "sid").is_none());
        assert!(extract_bearer_token("Basic abc").is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let settings = HttpSettings {
            cookie_name: "sid".into(),
            secure_cookie: true,
            request_timeout: std::time::Duration::from_secs(30),
        };
        let cookie = session_cookie(&settings, &SessionToken::from_client("abc"));
        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
