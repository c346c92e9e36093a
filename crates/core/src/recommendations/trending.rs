//! Trend ranking

use crate::domain::product::Product;

use super::aggregate::PurchaseCounts;

/// Ranks product identifiers by units sold and resolves the top `limit` of
/// them against the catalog.
///
/// Equal counts keep first-seen ledger order (the sort is stable). Ids that
/// match no product by primary id or sku are dropped after truncation, so the
/// list is not padded back up to `limit`.
pub fn rank_trending(counts: &PurchaseCounts, catalog: &[Product], limit: usize) -> Vec<Product> {
    let mut ranked: Vec<(&str, u64)> = counts.iter().collect();
    ranked.sort_by(|left, right| right.1.cmp(&left.1));

    ranked
        .into_iter()
        .take(limit)
        .filter_map(|(product_id, _)| {
            catalog.iter().find(|product| product.matches_identifier(product_id)).cloned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("p1", "Tea", Decimal::new(40, 0), 25),
            Product::new("p2", "Chips", Decimal::new(30, 0), 40).with_sku("SNK-002"),
            Product::new("p3", "Donut", Decimal::new(35, 0), 35),
        ]
    }

    fn counts(entries: &[(&str, u32)]) -> PurchaseCounts {
        let mut counts = PurchaseCounts::default();
        for (id, quantity) in entries {
            counts.record(id, *quantity);
        }
        counts
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(Product::identity_key).collect()
    }

    #[test]
    fn ranks_by_descending_units() {
        let ranked = rank_trending(&counts(&[("p1", 3), ("p2", 5)]), &catalog(), 5);

        assert_eq!(ids(&ranked), vec!["p2", "p1"]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let ranked = rank_trending(&counts(&[("p3", 2), ("p1", 2), ("p2", 1)]), &catalog(), 5);

        assert_eq!(ids(&ranked), vec!["p3", "p1", "p2"]);
    }

    #[test]
    fn resolves_sku_alias_to_catalog_entry() {
        let ranked = rank_trending(&counts(&[("SNK-002", 4)]), &catalog(), 5);

        assert_eq!(ids(&ranked), vec!["p2"]);
    }

    #[test]
    fn unknown_ids_are_dropped_without_padding() {
        let ranked = rank_trending(&counts(&[("gone", 9), ("p1", 3), ("p2", 1)]), &catalog(), 2);

        assert_eq!(ids(&ranked), vec!["p1"]);
    }

    #[test]
    fn limit_caps_the_list() {
        let entries: Vec<(String, u32)> = (0..8).map(|n| (format!("x{n}"), 8 - n)).collect();
        let mut counts = PurchaseCounts::default();
        let mut catalog = Vec::new();
        for (id, quantity) in &entries {
            counts.record(id, *quantity);
            catalog.push(Product::new(id.clone(), id.clone(), Decimal::ONE, 1));
        }

        let ranked = rank_trending(&counts, &catalog, 5);

        assert_eq!(ids(&ranked), vec!["x0", "x1", "x2", "x3", "x4"]);
    }
}
