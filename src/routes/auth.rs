use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use crate::auth::middleware::{clear_session_cookie, session_cookie};
use crate::models::user::LoginRequest;
use crate::templates::{base_context, render};
use crate::{AppError, AppState, Result};

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login. Anything that a
/// browser could reinterpret as another host, or that is not a valid
/// `Location` value, falls back to `/`.
pub fn safe_next(next: Option<&str>) -> String {
    let Some(path) = next else {
        return "/".to_string();
    };

    let local = path.starts_with('/')
        && !matches!(path.chars().nth(1), Some('/') | Some('\\'))
        && !path.contains('\\')
        && !path.chars().any(|c| c.is_ascii_control() || c.is_whitespace());

    if local && HeaderValue::try_from(path).is_ok() {
        path.to_string()
    } else {
        "/".to_string()
    }
}

fn render_login(app_state: &AppState, username: &str, next: &str, error: Option<&str>) -> Result<Html<String>> {
    let mut context = base_context(None);
    context.insert("username", username);
    context.insert("next", next);
    context.insert("error", &error);
    render(&app_state.templates, "login.html", &context)
}

pub async fn login_form(
    State(app_state): State<AppState>,
    Query(params): Query<NextParam>,
) -> Result<Html<String>> {
    render_login(&app_state, "", &safe_next(params.next.as_deref()), None)
}

pub async fn login(
    State(app_state): State<AppState>,
    Form(request): Form<LoginRequest>,
) -> Result<Response> {
    let next = safe_next(request.next.as_deref());

    match app_state
        .user_service
        .authenticate_user(&request.username, &request.password, &app_state.auth_service)
        .await
    {
        Ok((user, token)) => {
            tracing::info!("🔑 AUTH: {} logged in", user.username);
            let cookie = session_cookie(token, app_state.auth_service.session_ttl());
            Ok(([(header::SET_COOKIE, cookie.to_string())], Redirect::to(&next)).into_response())
        }
        Err(AppError::AuthError(message)) => {
            tracing::info!("AUTH: Failed login for {:?}", request.username);
            Ok(render_login(&app_state, &request.username, &next, Some(&message))?.into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn logout() -> Response {
    (
        [(header::SET_COOKIE, clear_session_cookie().to_string())],
        Redirect::to("/"),
    )
        .into_response()
}
