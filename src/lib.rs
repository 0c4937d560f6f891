// Library modules for the blog application
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod models;
pub mod routes;
pub mod services;
pub mod templates;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};

use std::sync::Arc;

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: db::DatabaseClient,
    pub post_service: Arc<services::PostService>,
    pub tag_service: Arc<services::TagService>,
    pub user_service: Arc<services::UserService>,
    pub auth_service: Arc<auth::AuthService>,
    pub templates: Arc<tera::Tera>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = db::DatabaseClient::new(&config).await?;
        Self::with_database(config, db)
    }

    /// Wires the services onto an already opened storage backend.
    pub fn with_database(config: AppConfig, db: db::DatabaseClient) -> Result<Self> {
        let auth_service = Arc::new(auth::AuthService::new(config.jwt_secret.clone(), config.session_ttl_hours));
        let post_service = Arc::new(services::PostService::new(
            db.post_repo.clone(),
            db.tag_repo.clone(),
            config.posts_per_page,
        ));
        let tag_service = Arc::new(services::TagService::new(db.tag_repo.clone()));
        let user_service = Arc::new(services::UserService::new(db.user_repo.clone()));
        let templates = Arc::new(templates::build_engine()?);

        Ok(Self {
            config,
            db,
            post_service,
            tag_service,
            user_service,
            auth_service,
            templates,
        })
    }
}
