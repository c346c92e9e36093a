use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl SaleItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32, price: Decimal) -> Self {
        Self { id: id.into(), name: name.into(), quantity, price }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A recorded checkout. Immutable once written to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub order_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userEmail", default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub items: Vec<SaleItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

impl Sale {
    /// Builds a sale stamped with the current time, a fresh order id and the
    /// sum of its line totals.
    pub fn new(user_id: impl Into<String>, items: Vec<SaleItem>) -> Self {
        let total = items.iter().map(SaleItem::line_total).sum();
        let now = Utc::now().timestamp_millis();
        Self {
            order_id: generate_order_id(now),
            user_id: user_id.into(),
            user_email: None,
            items,
            total,
            timestamp: now,
        }
    }

    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::MissingFields("userId".to_string()));
        }
        if self.total.is_sign_negative() {
            return Err(DomainError::InvariantViolation(
                "sale total must not be negative".to_string(),
            ));
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(DomainError::InvariantViolation(format!(
                    "line item `{}` must have a positive quantity",
                    item.id
                )));
            }
            if item.price.is_sign_negative() {
                return Err(DomainError::InvariantViolation(format!(
                    "line item `{}` must not have a negative price",
                    item.id
                )));
            }
        }
        Ok(())
    }
}

/// `ORD-<unix millis>-<0..9999>`
pub fn generate_order_id(timestamp_millis: i64) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("ORD-{timestamp_millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{generate_order_id, Sale, SaleItem};
    use crate::errors::DomainError;

    #[test]
    fn new_sale_sums_line_totals() {
        let sale = Sale::new(
            "19332",
            vec![
                SaleItem::new("prod-coffee", "Coffee", 2, Decimal::new(50, 0)),
                SaleItem::new("prod-cookie", "Cookie", 3, Decimal::new(20, 0)),
            ],
        );

        assert_eq!(sale.total, Decimal::new(160, 0));
        assert_eq!(sale.total_units(), 5);
        assert!(sale.order_id.starts_with("ORD-"));
    }

    #[test]
    fn order_id_embeds_timestamp_and_bounded_suffix() {
        let order_id = generate_order_id(1_700_000_000_000);
        let mut parts = order_id.splitn(3, '-');

        assert_eq!(parts.next(), Some("ORD"));
        assert_eq!(parts.next(), Some("1700000000000"));
        let suffix: u32 = parts.next().and_then(|raw| raw.parse().ok()).expect("numeric suffix");
        assert!(suffix < 10_000);
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let sale = Sale::new("19332", vec![SaleItem::new("p1", "Tea", 0, Decimal::new(40, 0))]);

        assert!(matches!(sale.validate(), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn blank_user_is_rejected() {
        let sale = Sale::new("  ", Vec::new());

        assert_eq!(sale.validate(), Err(DomainError::MissingFields("userId".to_string())));
    }

    #[test]
    fn wire_shape_uses_camel_case_user_fields() {
        let mut sale = Sale::new("STU002", vec![SaleItem::new("p1", "Juice", 1, Decimal::new(60, 0))]);
        sale.user_email = Some("jane@example.com".to_string());
        let json = serde_json::to_value(&sale).expect("serialize sale");

        assert_eq!(json["userId"], "STU002");
        assert_eq!(json["userEmail"], "jane@example.com");
        assert_eq!(json["total"], serde_json::json!(60.0));
        assert_eq!(json["items"][0]["quantity"], 1);
    }
}
