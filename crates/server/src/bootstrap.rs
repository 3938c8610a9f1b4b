use std::sync::Arc;

use cartwright_core::config::{AppConfig, ConfigError, LoadOptions};
use cartwright_core::engine::{CartCommandEngine, EngineSettings};
use cartwright_core::vocabulary::{VocabularySet, VocabularyStore};
use cartwright_db::{connect_from_config, migrations, DbPool, SqlProductCatalog, SqlSessionStore};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub engine: Arc<CartCommandEngine>,
    pub vocabulary: Arc<VocabularyStore>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        session_id = "unknown",
        "database migrations applied"
    );

    let vocabulary =
        Arc::new(VocabularyStore::new(VocabularySet::with_overrides(1, &config.vocabulary)));
    let search = cartwright_search::from_config(&config.search);
    let engine = Arc::new(CartCommandEngine::new(
        Arc::new(SqlProductCatalog::new(db_pool.clone())),
        search,
        Arc::new(SqlSessionStore::new(db_pool.clone())),
        Arc::clone(&vocabulary),
        EngineSettings::from(&config.search),
    ));
    info!(
        event_name = "system.bootstrap.engine_ready",
        correlation_id = "bootstrap",
        session_id = "unknown",
        search_enabled = config.search.endpoint.is_some(),
        "command engine constructed"
    );

    Ok(Application { config, db_pool, engine, vocabulary })
}
