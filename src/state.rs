use crate::config::AppConfig;
use crate::users::repo::{InMemoryUserRepository, PgUserRepository, UserRepository};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let users = match &config.database {
            Some(db_config) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(db_config.max_connections)
                    .connect(&db_config.url)
                    .await
                    .context("connect to database")?;
                run_migrations(&db).await;
                Arc::new(PgUserRepository::new(db)) as Arc<dyn UserRepository>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory only");
                Arc::new(InMemoryUserRepository::new()) as Arc<dyn UserRepository>
            }
        };

        Ok(Self { users, config })
    }

    pub fn from_parts(users: Arc<dyn UserRepository>, config: Arc<AppConfig>) -> Self {
        Self { users, config }
    }

    /// Fresh in-memory state with default config.
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(AppConfig::default()),
        )
    }
}

async fn run_migrations(db: &PgPool) {
    if let Err(e) = sqlx::migrate!("./migrations").run(db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }
}
