use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kiosk_core::domain::sale::{generate_order_id, Sale, SaleItem};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{failure, internal_failure, ApiFailure, ApiState};

const MISSING_FIELDS: &str = "Missing required fields (userId, items, total)";

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    pub order_id: String,
}

/// Validated checkout body. `total` must arrive as a JSON number; it is
/// taken as stated, not recomputed from the lines.
#[derive(Debug, PartialEq)]
struct Checkout {
    user_id: String,
    user_email: Option<String>,
    items: Vec<SaleItem>,
    total: Decimal,
    timestamp: Option<i64>,
}

impl Checkout {
    fn from_body(body: &Value) -> Option<Self> {
        let user_id = body.get("userId")?.as_str().filter(|id| !id.trim().is_empty())?;
        let items = body.get("items").filter(|items| items.is_array())?;
        let items: Vec<SaleItem> = serde_json::from_value(items.clone()).ok()?;
        let total = number_to_decimal(body.get("total")?)?;

        Some(Self {
            user_id: user_id.to_string(),
            user_email: body.get("userEmail").and_then(Value::as_str).map(str::to_string),
            items,
            total,
            timestamp: body.get("timestamp").and_then(Value::as_i64),
        })
    }

    fn into_sale(self, now_millis: i64) -> Sale {
        Sale {
            order_id: generate_order_id(now_millis),
            user_id: self.user_id,
            user_email: self.user_email,
            items: self.items,
            total: self.total,
            timestamp: self.timestamp.unwrap_or(now_millis),
        }
    }
}

fn number_to_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(number) = value else {
        return None;
    };
    let text = number.to_string();
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(&text).ok())
        .or_else(|| number.as_f64().and_then(|float| Decimal::try_from(float).ok()))
}

pub async fn list(
    State(state): State<ApiState>,
    Query(query): Query<SalesQuery>,
) -> Result<Json<Vec<Sale>>, ApiFailure> {
    let user_id = query.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let sales = match user_id {
        Some(user_id) => state.sales.list_for_user(user_id).await,
        None => state.sales.list_all().await,
    };

    sales
        .map(Json)
        .map_err(|error| internal_failure("api.sales.list_failed", error, "Error fetching sales"))
}

/// Records a checkout and debits the buyer's wallet by the stated total.
///
/// The two writes are separate: a failed debit leaves the sale recorded.
/// Stock is not touched here; the storefront adjusts it per line through
/// `update-quantity`.
pub async fn checkout(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiFailure> {
    let checkout = body.ok().and_then(|Json(body)| Checkout::from_body(&body));
    let Some(checkout) = checkout else {
        warn!(event_name = "api.sales.invalid_body", "checkout body missing required fields");
        return Err(failure(StatusCode::BAD_REQUEST, MISSING_FIELDS));
    };

    let sale = checkout.into_sale(Utc::now().timestamp_millis());
    sale.validate().map_err(|error| failure(StatusCode::BAD_REQUEST, error.to_string()))?;

    let buyer = state
        .users
        .find_by_admission_number(&sale.user_id)
        .await
        .map_err(|error| internal_failure("api.sales.user_lookup_failed", error, "Error recording sale"))?;
    if buyer.is_none() {
        return Err(failure(StatusCode::NOT_FOUND, "User not found"));
    }

    let order_id = sale.order_id.clone();
    let user_id = sale.user_id.clone();
    let total = sale.total;
    let items = sale.items.len();
    state
        .sales
        .record(sale)
        .await
        .map_err(|error| internal_failure("api.sales.record_failed", error, "Error recording sale"))?;

    let balance = state
        .users
        .adjust_wallet_balance(&user_id, -total)
        .await
        .map_err(|error| internal_failure("api.sales.debit_failed", error, "Error recording sale"))?;
    if balance.is_none() {
        warn!(
            event_name = "api.sales.debit_skipped",
            correlation_id = %order_id,
            user_id = %user_id,
            "buyer disappeared before the wallet debit"
        );
    }

    info!(
        event_name = "api.sales.recorded",
        correlation_id = %order_id,
        user_id = %user_id,
        items,
        total = %total,
        "sale recorded"
    );

    Ok(Json(CheckoutResponse { message: "Sale recorded successfully", order_id }))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        Json,
    };
    use kiosk_core::domain::sale::SaleItem;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{checkout, list, Checkout, SalesQuery, MISSING_FIELDS};
    use crate::api::test_support;

    fn body(total: serde_json::Value) -> serde_json::Value {
        json!({
            "userId": "19332",
            "userEmail": "john@example.com",
            "items": [
                {"id": "prod-coffee", "name": "Coffee", "quantity": 2, "price": 50},
                {"id": "prod-chips", "name": "Chips", "quantity": 1, "price": 30}
            ],
            "total": total
        })
    }

    #[test]
    fn checkout_body_requires_numeric_total() {
        assert!(Checkout::from_body(&body(json!(130))).is_some());
        assert!(Checkout::from_body(&body(json!(129.5))).is_some());
        assert!(Checkout::from_body(&body(json!("130"))).is_none());
        assert!(Checkout::from_body(&json!({"userId": "19332", "total": 10})).is_none());
        assert!(Checkout::from_body(&json!({"items": [], "total": 10})).is_none());
    }

    #[test]
    fn checkout_keeps_client_timestamp_and_fills_missing_one() {
        let mut with_stamp = body(json!(130));
        with_stamp["timestamp"] = json!(1_700_000_000_000_i64);
        let stamped = Checkout::from_body(&with_stamp).expect("valid").into_sale(42);
        let unstamped = Checkout::from_body(&body(json!(130))).expect("valid").into_sale(42);

        assert_eq!(stamped.timestamp, 1_700_000_000_000);
        assert_eq!(unstamped.timestamp, 42);
        assert!(unstamped.order_id.starts_with("ORD-42-"));
    }

    #[tokio::test]
    async fn checkout_records_sale_and_debits_wallet() {
        let state = test_support::state();

        let Json(response) =
            checkout(State(state.clone()), Ok(Json(body(json!(130))))).await.expect("checkout");

        assert_eq!(response.message, "Sale recorded successfully");
        assert!(response.order_id.starts_with("ORD-"));
        let buyer = state
            .users
            .find_by_admission_number("19332")
            .await
            .expect("lookup")
            .expect("buyer exists");
        assert_eq!(buyer.wallet_balance, Decimal::new(370, 0));

        let Json(history) = list(
            State(state),
            Query(SalesQuery { user_id: Some("19332".to_string()) }),
        )
        .await
        .expect("history");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].order_id, response.order_id);
        assert_eq!(history[0].user_email.as_deref(), Some("john@example.com"));
    }

    #[tokio::test]
    async fn string_total_is_rejected_with_fixed_message() {
        let (status, Json(error)) = checkout(State(test_support::state()), Ok(Json(body(json!("130")))))
            .await
            .expect_err("string total");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error, MISSING_FIELDS);
    }

    #[tokio::test]
    async fn unknown_buyer_is_not_found_and_nothing_is_recorded() {
        let state = test_support::state();
        let mut unknown = body(json!(130));
        unknown["userId"] = json!("STU999");

        let (status, Json(error)) =
            checkout(State(state.clone()), Ok(Json(unknown))).await.expect_err("unknown buyer");

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error.error, "User not found");
        let Json(sales) = list(State(state), Query(SalesQuery::default())).await.expect("list");
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn history_filter_only_returns_that_users_orders() {
        let state = test_support::state_with(
            vec![
                test_support::sale(
                    "19332",
                    "ORD-1",
                    vec![SaleItem::new("prod-tea", "Tea", 1, Decimal::new(40, 0))],
                ),
                test_support::sale(
                    "STU002",
                    "ORD-2",
                    vec![SaleItem::new("prod-coffee", "Coffee", 1, Decimal::new(50, 0))],
                ),
            ],
            Vec::new(),
        );

        let Json(all) =
            list(State(state.clone()), Query(SalesQuery::default())).await.expect("all sales");
        let Json(mine) = list(State(state), Query(SalesQuery { user_id: Some("STU002".to_string()) }))
            .await
            .expect("filtered");

        assert_eq!(all.len(), 2);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].order_id, "ORD-2");
    }
}
