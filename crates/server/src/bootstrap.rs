use std::sync::Arc;

use kiosk_agent::{build_oracle, GeminiError};
use kiosk_core::config::{AppConfig, ConfigError};
use kiosk_core::recommendations::{RecommendationEngine, RecommendationLimits, SuggestionOracle};
use kiosk_db::repositories::{
    SqlFeedbackRepository, SqlProductRepository, SqlSaleRepository, SqlUserRepository,
};
use kiosk_db::{connect_with_settings, migrations, DbPool, RepositoryCatalog, RepositoryLedger};
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: ApiState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("suggestion oracle setup failed: {0}")]
    Oracle(#[from] GeminiError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let oracle = build_oracle(&config.oracle)?;
    let state = api_state(&db_pool, &config, oracle);

    Ok(Application { config, db_pool, state })
}

fn api_state(
    db_pool: &DbPool,
    config: &AppConfig,
    oracle: Arc<dyn SuggestionOracle>,
) -> ApiState {
    let products = Arc::new(SqlProductRepository::new(db_pool.clone()));
    let sales = Arc::new(SqlSaleRepository::new(db_pool.clone()));

    let engine = RecommendationEngine::new(
        Arc::new(RepositoryLedger::new(sales.clone())),
        Arc::new(RepositoryCatalog::new(products.clone())),
        oracle,
    )
    .with_limits(RecommendationLimits {
        trending: config.recommendations.trending_limit,
        ai: config.recommendations.ai_limit,
    });

    ApiState {
        products,
        sales,
        users: Arc::new(SqlUserRepository::new(db_pool.clone())),
        feedback: Arc::new(SqlFeedbackRepository::new(db_pool.clone())),
        engine,
    }
}

#[cfg(test)]
mod tests {
    use kiosk_core::config::{AppConfig, ConfigOverrides, LoadOptions, OracleProvider};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?).await
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_when_gemini_has_no_api_key() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                oracle_provider: Some(OracleProvider::Gemini),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("missing key should fail").to_string();
        assert!(message.contains("oracle.api_key"), "unexpected error: {message}");
    }

    #[tokio::test]
    async fn bootstrap_applies_schema_and_serves_trending_only_without_oracle() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with an in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('product', 'sale', 'sale_item', 'kiosk_user', 'feedback')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("count baseline tables");
        assert_eq!(table_count, 5);

        let result =
            app.state.engine.get_recommendations(None).await.expect("empty store recommends");
        assert!(result.trending.is_empty());
        assert!(result.ai.is_empty());
        assert!(result.all.is_empty());
        assert_eq!(app.state.engine.limits().trending, app.config.recommendations.trending_limit);

        app.db_pool.close().await;
    }
}
