//! Storefront recommendation pipeline
//!
//! Every request rebuilds its aggregates from the full sales ledger, ranks a
//! deterministic "trending" list, asks the suggestion oracle for extra picks
//! and merges both into one deduplicated result. Nothing is cached between
//! requests.

mod aggregate;
mod engine;
mod merge;
mod prompt;
mod trending;
mod types;

pub use aggregate::{PurchaseCounts, SalesAggregate, UserPurchaseHistory};
pub use engine::{CatalogStore, RecommendationEngine, SalesLedger, SuggestionOracle};
pub use merge::{match_suggestions, merge_results};
pub use prompt::PromptBuilder;
pub use trending::rank_trending;
pub use types::*;

/// Maximum trending entries returned
pub const DEFAULT_TRENDING_LIMIT: usize = 5;

/// Maximum oracle-sourced entries returned
pub const DEFAULT_AI_LIMIT: usize = 5;
