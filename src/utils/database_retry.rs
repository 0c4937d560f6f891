use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use crate::{AppError, Result};

/// Backoff settings for retrying storage operations that may fail transiently,
/// such as the first connection while PostgreSQL is still starting.
#[derive(Debug, Clone)]
pub struct DatabaseRetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for DatabaseRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
        }
    }
}

impl DatabaseRetryConfig {
    fn next_delay(&self, delay: u64) -> u64 {
        let grown = ((delay as f64) * self.backoff_multiplier) as u64;
        grown.min(self.max_delay_ms).max(1)
    }
}

/// Runs `operation` until it succeeds or `max_retries` attempts are used up,
/// returning the last error.
pub async fn retry_database_operation<F, Fut, T>(
    label: &str,
    operation: F,
    config: DatabaseRetryConfig,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_retries.max(1);
    let mut delay = config.initial_delay_ms;
    let mut last_error = AppError::DatabaseError(format!("{}: no attempt made", label));

    for attempt in 1..=attempts {
        tracing::debug!("🔄 DATABASE: {} attempt {}/{}", label, attempt, attempts);

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!("✅ DATABASE: {} succeeded on attempt {}", label, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = e;

                if attempt < attempts {
                    tracing::warn!(
                        "⚠️ DATABASE: {} attempt {} failed: {}, retrying in {}ms",
                        label, attempt, last_error, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = config.next_delay(delay);
                }
            }
        }
    }

    tracing::error!("❌ DATABASE: {} failed after {} attempts: {}", label, attempts, last_error);
    Err(last_error)
}

pub async fn with_database_retry<F, Fut, T>(label: &str, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_database_operation(label, operation, DatabaseRetryConfig::default()).await
}
