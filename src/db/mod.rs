pub mod postgres;
pub mod repository;

// Database connection and state management
use std::sync::Arc;
use crate::config::AppConfig;
use crate::utils::database_retry::with_database_retry;
use crate::Result;
use postgres::PostgresDatabase;
use repository::{InMemoryRepository, PostRepository, TagRepository, UserRepository};

#[derive(Clone)]
pub struct DatabaseClient {
    pub post_repo: Arc<dyn PostRepository>,
    pub tag_repo: Arc<dyn TagRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    postgres: Option<Arc<PostgresDatabase>>,
}

impl DatabaseClient {
    /// Connects to PostgreSQL when `DATABASE_URL` is set, otherwise falls back
    /// to a process-local store.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        match &config.database_url {
            Some(url) => {
                let database = with_database_retry("connect", || PostgresDatabase::connect(url)).await?;
                database.run_migrations().await?;
                tracing::info!("✅ DATABASE: Using PostgreSQL storage");
                Ok(Self::from_postgres(database))
            }
            None => {
                tracing::warn!("⚠️ DATABASE: DATABASE_URL not set, using in-memory storage (data is lost on restart)");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryRepository::new());
        Self {
            post_repo: store.clone(),
            tag_repo: store.clone(),
            user_repo: store,
            postgres: None,
        }
    }

    fn from_postgres(database: PostgresDatabase) -> Self {
        Self {
            post_repo: Arc::new(database.post_repo()),
            tag_repo: Arc::new(database.tag_repo()),
            user_repo: Arc::new(database.user_repo()),
            postgres: Some(Arc::new(database)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        if self.postgres.is_some() { "postgres" } else { "memory" }
    }

    pub async fn health_check(&self) -> Result<()> {
        match &self.postgres {
            Some(database) => database.health_check().await,
            None => Ok(()),
        }
    }
}
