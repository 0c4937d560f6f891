use std::env;
use std::str::FromStr;
use tracing::Level;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub posts_per_page: u32,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub log_level: Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            database_url: None,
            jwt_secret: "dev-secret-change-in-production".to_string(),
            session_ttl_hours: 24,
            posts_per_page: 1,
            admin_username: None,
            admin_password: None,
            log_level: Level::INFO,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("PORT")
                .or_else(|_| env::var("SERVER_PORT"))
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.server_port),
            database_url: non_empty_var("DATABASE_URL"),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|hours| hours.parse().ok())
                .filter(|hours: &i64| *hours > 0)
                .unwrap_or(defaults.session_ttl_hours),
            posts_per_page: env::var("POSTS_PER_PAGE")
                .ok()
                .and_then(|size| size.parse().ok())
                .filter(|size: &u32| *size > 0)
                .unwrap_or(defaults.posts_per_page),
            admin_username: non_empty_var("ADMIN_USERNAME"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
            log_level: env::var("LOG_LEVEL")
                .ok()
                .and_then(|level| Level::from_str(&level).ok())
                .unwrap_or(defaults.log_level),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
