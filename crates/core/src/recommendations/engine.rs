//! Recommendation engine

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::product::Product;
use crate::domain::sale::Sale;
use crate::errors::ApplicationError;

use super::aggregate::SalesAggregate;
use super::merge::{match_suggestions, merge_results};
use super::prompt::PromptBuilder;
use super::trending::rank_trending;
use super::types::{OracleReply, RecommendationLimits, RecommendationResult};

/// Read access to every recorded sale.
#[async_trait]
pub trait SalesLedger: Send + Sync {
    async fn list_all_sales(&self) -> Result<Vec<Sale>, ApplicationError>;
}

/// Read access to the full product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_all_products(&self) -> Result<Vec<Product>, ApplicationError>;
}

/// External suggestion source. Implementations swallow their own failures
/// and report them as [`OracleReply::Empty`].
#[async_trait]
pub trait SuggestionOracle: Send + Sync {
    async fn suggest(&self, prompt: &str) -> OracleReply;
}

#[derive(Clone)]
pub struct RecommendationEngine {
    ledger: Arc<dyn SalesLedger>,
    catalog: Arc<dyn CatalogStore>,
    oracle: Arc<dyn SuggestionOracle>,
    limits: RecommendationLimits,
}

impl RecommendationEngine {
    pub fn new(
        ledger: Arc<dyn SalesLedger>,
        catalog: Arc<dyn CatalogStore>,
        oracle: Arc<dyn SuggestionOracle>,
    ) -> Self {
        Self { ledger, catalog, oracle, limits: RecommendationLimits::default() }
    }

    pub fn with_limits(mut self, limits: RecommendationLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> RecommendationLimits {
        self.limits
    }

    /// Builds recommendations from a fresh read of the ledger and catalog.
    ///
    /// Ledger and catalog failures abort the request. Oracle failures only
    /// empty the `ai` list.
    pub async fn get_recommendations(
        &self,
        requesting_user: Option<&str>,
    ) -> Result<RecommendationResult, ApplicationError> {
        let sales = self.ledger.list_all_sales().await?;
        let catalog = self.catalog.list_all_products().await?;
        Ok(self.recommend_from(&sales, &catalog, requesting_user).await)
    }

    pub async fn recommend_from(
        &self,
        sales: &[Sale],
        catalog: &[Product],
        requesting_user: Option<&str>,
    ) -> RecommendationResult {
        let aggregate = SalesAggregate::from_sales(sales);
        let trending = rank_trending(&aggregate.counts, catalog, self.limits.trending);

        let prompt = PromptBuilder::new(self.limits.ai).build(
            &aggregate.histories,
            catalog,
            requesting_user.filter(|user| !user.trim().is_empty()),
        );
        debug!(
            event_name = "recommendations.prompt.built",
            prompt_chars = prompt.len(),
            "oracle prompt assembled"
        );

        let suggestions = self.oracle.suggest(&prompt).await.into_suggestions();
        let ai = match_suggestions(&suggestions, catalog, self.limits.ai);
        let all = merge_results(&trending, &ai);

        info!(
            event_name = "recommendations.generated",
            sales = sales.len(),
            catalog = catalog.len(),
            distinct_products_sold = aggregate.counts.len(),
            oracle_suggestions = suggestions.len(),
            trending = trending.len(),
            ai = ai.len(),
            all = all.len(),
            "recommendations generated"
        );

        RecommendationResult { trending, ai, all }
    }
}
