use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::services::ServeDir;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new("static"))
}

async fn health_check(State(app_state): State<AppState>) -> Response {
    match app_state.db.health_check().await {
        Ok(()) => Html("<!DOCTYPE html><html><body><h1>OK</h1></body></html>").into_response(),
        Err(e) => {
            tracing::error!("❌ HEALTH: Storage check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Html("<!DOCTYPE html><html><body><h1>Unavailable</h1></body></html>")).into_response()
        }
    }
}
