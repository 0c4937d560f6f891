// Session handling for login-gated routes
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use cookie::{Cookie, SameSite};
use std::convert::Infallible;
use crate::auth::{Claims, SESSION_COOKIE};
use crate::{AppError, AppState};

/// Session token from an `Authorization: Bearer` header, else from the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value.to_string()))
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

pub fn session_cookie(token: String, ttl: chrono::Duration) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(ttl.num_seconds()));
    cookie
}

pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Rejects the request with 403 unless it carries a valid session, and makes
/// the claims available to the handler as [`LoggedInUser`].
pub async fn require_login(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers())
        .ok_or_else(|| AppError::PermissionDenied("You must be logged in to do that".to_string()))?;

    let claims = app_state.auth_service.verify_token(&token).map_err(|e| {
        tracing::debug!("AUTH: Rejected session for {} {}: {}", request.method(), request.uri().path(), e);
        AppError::PermissionDenied("Your session is invalid or has expired".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// The session of a request that went through [`require_login`].
#[derive(Debug, Clone)]
pub struct LoggedInUser(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for LoggedInUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(LoggedInUser)
            .ok_or_else(|| AppError::PermissionDenied("You must be logged in to do that".to_string()))
    }
}

/// Optional session for public pages, used to show login state in the layout.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<Claims>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Ok(CurrentUser(Some(claims.clone())));
        }
        let claims = session_token(&parts.headers)
            .and_then(|token| state.auth_service.verify_token(&token).ok());
        Ok(CurrentUser(claims))
    }
}
