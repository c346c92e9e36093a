use std::sync::Arc;

use kiosk_agent::build_oracle;
use kiosk_core::recommendations::{RecommendationEngine, RecommendationLimits};
use kiosk_db::repositories::{SqlProductRepository, SqlSaleRepository};
use kiosk_db::{RepositoryCatalog, RepositoryLedger};

use crate::commands::{run_with_database, CommandResult, StepError};

pub fn run(user: Option<&str>) -> CommandResult {
    let outcome = run_with_database("recommend", |config, pool| async move {
        let oracle = build_oracle(&config.oracle)
            .map_err(|error| ("oracle_setup", error.to_string(), 7u8))?;
        let engine = RecommendationEngine::new(
            Arc::new(RepositoryLedger::new(Arc::new(SqlSaleRepository::new(pool.clone())))),
            Arc::new(RepositoryCatalog::new(Arc::new(SqlProductRepository::new(pool)))),
            oracle,
        )
        .with_limits(RecommendationLimits {
            trending: config.recommendations.trending_limit,
            ai: config.recommendations.ai_limit,
        });

        let result = engine
            .get_recommendations(user)
            .await
            .map_err(|error| ("recommendation", error.to_string(), 8u8))?;
        Ok::<_, StepError>(result)
    });

    let result = match outcome {
        Ok(result) => result,
        Err(failure) => return failure,
    };

    let message = format!(
        "{} trending, {} ai, {} merged",
        result.trending.len(),
        result.ai.len(),
        result.all.len()
    );
    match serde_json::to_value(&result) {
        Ok(data) => CommandResult::success_with_data("recommend", message, Some(data)),
        Err(error) => CommandResult::failure("recommend", "serialization", error.to_string(), 9),
    }
}
