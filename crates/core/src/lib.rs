pub mod config;
pub mod domain;
pub mod errors;
pub mod recommendations;

pub use domain::feedback::{Feedback, FeedbackSubmission};
pub use domain::product::{Product, ProductId};
pub use domain::sale::{Sale, SaleItem};
pub use domain::user::{KioskUser, UserRole};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommendations::{
    CatalogStore, OracleReply, OracleSuggestion, RecommendationEngine, RecommendationLimits,
    RecommendationResult, RecommendedProduct, SalesLedger, SuggestionOracle,
};
