use std::sync::Arc;

use chirpy_db::Database;
use tracing::error;

use crate::error::ApiError;
use crate::hits::HitCounter;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: ApiConfig,
    pub hits: HitCounter,
}

impl AppStateInner {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        Self {
            db,
            config,
            hits: HitCounter::new(),
        }
    }
}

/// Settings the request handlers need. Bind address, database location and
/// the assets directory belong to the server binary.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub jwt_secret: String,
    pub platform: Platform,
    /// Key the Polka payment provider presents on webhooks. `None` rejects every webhook.
    pub polka_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Dev,
    Production,
}

impl Platform {
    /// Only the exact value `dev` enables development-only routes.
    pub fn from_env_value(value: &str) -> Self {
        if value == "dev" { Self::Dev } else { Self::Production }
    }

    pub fn is_dev(self) -> bool {
        self == Self::Dev
    }
}

/// Run blocking work (SQLite, Argon2) off the async runtime.
pub async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal("Internal server error".into())
    })
}

/// Run a closure against the database on the blocking pool.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> T + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    run_blocking(move || f(&state.db)).await
}

/// Like [`with_db`], turning a store failure into a 500 carrying `context` as its message.
pub async fn db_call<F, T>(state: &AppState, context: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    with_db(state, f).await?.map_err(|e| {
        error!("{}: {:#}", context, e);
        ApiError::Internal(context.into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dev_is_dev() {
        assert!(Platform::from_env_value("dev").is_dev());
        assert!(!Platform::from_env_value("DEV").is_dev());
        assert!(!Platform::from_env_value("production").is_dev());
        assert!(!Platform::from_env_value("").is_dev());
    }
}
