//! Recommendation data types

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

use super::{DEFAULT_AI_LIMIT, DEFAULT_TRENDING_LIMIT};

/// One pick parsed out of the oracle reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSuggestion {
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

impl OracleSuggestion {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { name: name.into(), reason: reason.into() }
    }
}

/// Outcome of the oracle stage. Failures never escape the oracle boundary;
/// they collapse into `Empty`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OracleReply {
    Parsed(Vec<OracleSuggestion>),
    #[default]
    Empty,
}

impl OracleReply {
    pub fn into_suggestions(self) -> Vec<OracleSuggestion> {
        match self {
            Self::Parsed(suggestions) => suggestions,
            Self::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Parsed(suggestions) => suggestions.is_empty(),
            Self::Empty => true,
        }
    }
}

/// A catalog product copied into a result list, optionally carrying the
/// oracle's rationale. The canonical catalog record is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecommendedProduct {
    pub fn with_reason(product: &Product, reason: impl Into<String>) -> Self {
        Self { product: product.clone(), reason: Some(reason.into()) }
    }

    pub fn identity_key(&self) -> &str {
        self.product.identity_key()
    }
}

impl From<Product> for RecommendedProduct {
    fn from(product: Product) -> Self {
        Self { product, reason: None }
    }
}

/// Wire shape rendered directly by the storefront widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub trending: Vec<Product>,
    pub ai: Vec<RecommendedProduct>,
    pub all: Vec<RecommendedProduct>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationLimits {
    pub trending: usize,
    pub ai: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        Self { trending: DEFAULT_TRENDING_LIMIT, ai: DEFAULT_AI_LIMIT }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn reason_is_flattened_next_to_product_fields() {
        let product = Product::new("p3", "Juice", Decimal::new(60, 0), 30);
        let recommended = RecommendedProduct::with_reason(&product, "popular");
        let json = serde_json::to_value(&recommended).unwrap();

        assert_eq!(json["_id"], "p3");
        assert_eq!(json["name"], "Juice");
        assert_eq!(json["reason"], "popular");
    }

    #[test]
    fn trending_entries_serialize_without_reason() {
        let product = Product::new("p1", "Tea", Decimal::new(40, 0), 25);
        let json = serde_json::to_value(RecommendedProduct::from(product)).unwrap();

        assert!(json.get("reason").is_none());
    }

    #[test]
    fn empty_reply_yields_no_suggestions() {
        assert!(OracleReply::Empty.into_suggestions().is_empty());
        assert!(OracleReply::Parsed(Vec::new()).is_empty());
    }
}
