use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use kiosk_core::domain::product::{Product, ProductId};
use kiosk_core::errors::DomainError;
use kiosk_db::repositories::StockAdjustment;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{bad_json, failure, internal_failure, ApiFailure, ApiState};

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub id: String,
    #[serde(rename = "quantityChange")]
    pub quantity_change: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateQuantityResponse {
    pub message: &'static str,
    #[serde(rename = "newQuantity")]
    pub new_quantity: u32,
}

pub async fn list(State(state): State<ApiState>) -> Result<Json<Vec<Product>>, ApiFailure> {
    state
        .products
        .list_all()
        .await
        .map(Json)
        .map_err(|error| internal_failure("api.products.list_failed", error, "Error fetching products"))
}

pub async fn get_by_id(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiFailure> {
    match state.products.find_by_id(&ProductId(id)).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(failure(StatusCode::NOT_FOUND, "Product not found")),
        Err(error) => {
            Err(internal_failure("api.products.get_failed", error, "Error fetching product"))
        }
    }
}

pub async fn update_quantity(
    State(state): State<ApiState>,
    body: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<UpdateQuantityResponse>, ApiFailure> {
    let Json(request) = body.map_err(bad_json)?;
    let id = ProductId(request.id);

    let adjustment = state
        .products
        .adjust_quantity(&id, request.quantity_change)
        .await
        .map_err(|error| {
            internal_failure("api.products.update_quantity_failed", error, "Error updating quantity")
        })?;

    match adjustment {
        StockAdjustment::Updated { new_quantity } => {
            info!(
                event_name = "api.products.quantity_updated",
                product_id = %id,
                delta = request.quantity_change,
                new_quantity,
                "product stock adjusted"
            );
            Ok(Json(UpdateQuantityResponse { message: "Quantity updated", new_quantity }))
        }
        StockAdjustment::NotFound => Err(failure(StatusCode::NOT_FOUND, "Product not found")),
        StockAdjustment::Insufficient { available } => Err(failure(
            StatusCode::BAD_REQUEST,
            DomainError::InsufficientStock { product_id: id.to_string(), available }.to_string(),
        )),
        StockAdjustment::OverCapacity { available } => Err(failure(
            StatusCode::BAD_REQUEST,
            DomainError::StockOverflow { product_id: id.to_string(), available, max: u32::MAX }
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
        Json,
    };

    use super::{get_by_id, list, update_quantity, UpdateQuantityRequest};
    use crate::api::test_support;

    #[tokio::test]
    async fn list_returns_catalog_in_insertion_order() {
        let Json(products) = list(State(test_support::state())).await.expect("list");

        let names: Vec<&str> = products.iter().map(|product| product.name.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Tea", "Chips"]);
    }

    #[tokio::test]
    async fn get_by_id_finds_known_product() {
        let Json(product) = get_by_id(State(test_support::state()), Path("prod-tea".to_string()))
            .await
            .expect("tea exists");

        assert_eq!(product.name, "Tea");
    }

    #[tokio::test]
    async fn restock_and_sell_report_new_quantity() {
        let state = test_support::state();

        let Json(restocked) = update_quantity(
            State(state.clone()),
            Ok(Json(UpdateQuantityRequest { id: "prod-chips".to_string(), quantity_change: 8 })),
        )
        .await
        .expect("restock");
        assert_eq!(restocked.new_quantity, 10);
        assert_eq!(restocked.message, "Quantity updated");

        let Json(sold) = update_quantity(
            State(state),
            Ok(Json(UpdateQuantityRequest { id: "prod-chips".to_string(), quantity_change: -10 })),
        )
        .await
        .expect("sell out");
        assert_eq!(sold.new_quantity, 0);
    }

    #[tokio::test]
    async fn overselling_is_rejected_without_touching_stock() {
        let state = test_support::state();

        let (status, Json(body)) = update_quantity(
            State(state.clone()),
            Ok(Json(UpdateQuantityRequest { id: "prod-chips".to_string(), quantity_change: -3 })),
        )
        .await
        .expect_err("only two bags of chips");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("2 available"), "unexpected error: {}", body.error);
        let Json(chips) = get_by_id(State(state), Path("prod-chips".to_string()))
            .await
            .expect("chips exist");
        assert_eq!(chips.quantity, 2);
    }

    #[tokio::test]
    async fn restock_beyond_u32_is_rejected_and_catalog_still_lists() {
        let state = test_support::state();

        let (status, Json(body)) = update_quantity(
            State(state.clone()),
            Ok(Json(UpdateQuantityRequest {
                id: "prod-chips".to_string(),
                quantity_change: 5_000_000_000,
            })),
        )
        .await
        .expect_err("stock count overflow");

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("cannot exceed"), "unexpected error: {}", body.error);
        let Json(products) = list(State(state)).await.expect("catalog still lists");
        let chips = products.iter().find(|product| product.name == "Chips").expect("chips");
        assert_eq!(chips.quantity, 2);
    }

    #[tokio::test]
    async fn unknown_product_update_is_not_found() {
        let (status, _) = update_quantity(
            State(test_support::state()),
            Ok(Json(UpdateQuantityRequest { id: "prod-ghost".to_string(), quantity_change: 1 })),
        )
        .await
        .expect_err("missing product");

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
