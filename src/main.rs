use anyhow::Context;
use blog_app::routes::create_routes;
use blog_app::{AppConfig, AppState};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Create the configured login account if it does not exist yet
async fn seed_admin_user(app_state: &AppState) {
    let (Some(username), Some(password)) = (&app_state.config.admin_username, &app_state.config.admin_password) else {
        info!("STARTUP: ADMIN_USERNAME/ADMIN_PASSWORD not set, skipping account bootstrap");
        return;
    };

    match app_state
        .user_service
        .ensure_user(username, password, &app_state.auth_service)
        .await
    {
        Ok(user) => info!("✅ STARTUP: Login account '{}' is ready", user.username),
        Err(e) => warn!("⚠️ STARTUP: Failed to bootstrap login account '{}': {}", username, e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("Starting blog server...");

    let app_state = AppState::new(config.clone())
        .await
        .context("failed to initialise application state")?;
    info!("Application state initialized ({} storage)", app_state.db.backend_name());

    seed_admin_user(&app_state).await;

    let app = create_routes(app_state)
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind(config.server_address())
        .await
        .with_context(|| format!("failed to bind {}", config.server_address()))?;

    info!("Server running on http://{}", config.server_address());

    axum::serve(listener, app).await?;

    Ok(())
}
