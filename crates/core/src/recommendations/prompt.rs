//! Oracle prompt construction

use crate::domain::product::Product;

use super::aggregate::UserPurchaseHistory;
use super::DEFAULT_AI_LIMIT;

/// Renders purchase histories and the catalog into one instruction string.
///
/// Section order is fixed: raw history JSON, catalog names, an optional
/// focus-user clause, then the output-format instruction.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    suggestion_count: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self { suggestion_count: DEFAULT_AI_LIMIT }
    }
}

impl PromptBuilder {
    pub fn new(suggestion_count: usize) -> Self {
        Self { suggestion_count }
    }

    pub fn build(
        &self,
        histories: &UserPurchaseHistory,
        catalog: &[Product],
        requesting_user: Option<&str>,
    ) -> String {
        let history_json = serde_json::to_string(histories).unwrap_or_else(|_| "{}".to_string());
        let catalog_names =
            catalog.iter().map(|product| product.name.as_str()).collect::<Vec<_>>().join(", ");

        let mut prompt = format!(
            "Given the following user purchase history, suggest {} products that are likely to be \
             bought together (collaborative filtering, trending, and diversity):\n{}\n\
             Product catalog: {}\n",
            self.suggestion_count, history_json, catalog_names
        );

        if let Some(user_id) = requesting_user {
            if let Some(names) = histories.for_user(user_id).filter(|names| !names.is_empty()) {
                prompt.push_str(&format!(
                    "Focus on recommendations for user: {} (who bought: {})\n",
                    user_id,
                    names.join(", ")
                ));
            }
        }

        prompt.push_str(
            "Return a JSON array of objects: [{\"name\":..., \"reason\":...}] where reason \
             explains why each product is recommended.",
        );
        prompt
    }
}
