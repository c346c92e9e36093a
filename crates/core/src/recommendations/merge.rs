//! Suggestion matching and result merging

use std::collections::HashSet;

use crate::domain::product::Product;

use super::types::{OracleSuggestion, RecommendedProduct};

/// Maps oracle picks onto catalog products by exact name.
///
/// The first catalog entry with a matching name wins. Unmatched names are
/// dropped before the `limit` is applied, and oracle order is kept.
pub fn match_suggestions(
    suggestions: &[OracleSuggestion],
    catalog: &[Product],
    limit: usize,
) -> Vec<RecommendedProduct> {
    suggestions
        .iter()
        .filter_map(|suggestion| {
            catalog
                .iter()
                .find(|product| product.name == suggestion.name)
                .map(|product| RecommendedProduct::with_reason(product, suggestion.reason.clone()))
        })
        .take(limit)
        .collect()
}

/// Concatenates trending then AI entries, keeping only the first occurrence
/// of each product identity. A product already trending never picks up a
/// reason from a later AI duplicate.
pub fn merge_results(trending: &[Product], ai: &[RecommendedProduct]) -> Vec<RecommendedProduct> {
    let mut seen = HashSet::new();
    trending
        .iter()
        .cloned()
        .map(RecommendedProduct::from)
        .chain(ai.iter().cloned())
        .filter(|entry| seen.insert(entry.identity_key().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("p1", "Tea", Decimal::new(40, 0), 25),
            Product::new("p2", "Chips", Decimal::new(30, 0), 40),
            Product::new("p3", "Donut", Decimal::new(35, 0), 35),
            Product::new("p4", "Donut", Decimal::new(45, 0), 5),
        ]
    }

    #[test]
    fn matches_exact_names_and_attaches_reason() {
        let catalog = catalog();
        let suggestions = vec![
            OracleSuggestion::new("Donut", "sweet pairing"),
            OracleSuggestion::new("donut", "case differs"),
            OracleSuggestion::new("Pizza", "not sold here"),
            OracleSuggestion::new("Tea", "warm"),
        ];

        let matched = match_suggestions(&suggestions, &catalog, 5);

        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].identity_key(), "p3");
        assert_eq!(matched[0].reason.as_deref(), Some("sweet pairing"));
        assert_eq!(matched[1].identity_key(), "p1");
    }

    #[test]
    fn matching_copies_instead_of_mutating_catalog() {
        let catalog = catalog();
        let before = catalog.clone();

        let mut matched = match_suggestions(&[OracleSuggestion::new("Tea", "warm")], &catalog, 5);
        matched[0].product.quantity = 0;

        assert_eq!(catalog, before);
    }

    #[test]
    fn limit_applies_after_dropping_unmatched() {
        let catalog = catalog();
        let suggestions = vec![
            OracleSuggestion::new("Pizza", "missing"),
            OracleSuggestion::new("Tea", "a"),
            OracleSuggestion::new("Chips", "b"),
            OracleSuggestion::new("Donut", "c"),
        ];

        let matched = match_suggestions(&suggestions, &catalog, 2);
        let ids: Vec<&str> = matched.iter().map(RecommendedProduct::identity_key).collect();

        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn merge_keeps_trending_first_and_drops_ai_duplicates() {
        let catalog = catalog();
        let trending = vec![catalog[1].clone(), catalog[0].clone()];
        let ai = vec![
            RecommendedProduct::with_reason(&catalog[0], "repeat of trending"),
            RecommendedProduct::with_reason(&catalog[2], "new pick"),
        ];

        let all = merge_results(&trending, &ai);
        let ids: Vec<&str> = all.iter().map(RecommendedProduct::identity_key).collect();

        assert_eq!(ids, vec!["p2", "p1", "p3"]);
        assert_eq!(all[1].reason, None);
        assert_eq!(all[2].reason.as_deref(), Some("new pick"));
    }

    #[test]
    fn merge_dedups_repeated_ai_entries() {
        let catalog = catalog();
        let ai = vec![
            RecommendedProduct::with_reason(&catalog[2], "first"),
            RecommendedProduct::with_reason(&catalog[2], "second"),
        ];

        let all = merge_results(&[], &ai);

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].reason.as_deref(), Some("first"));
    }
}
