//! Storefront JSON API.
//!
//! Endpoints:
//! - `GET  /api/products`                  - full catalog
//! - `GET  /api/products/{id}`             - one product, 404 when absent
//! - `POST /api/products/update-quantity`  - move stock by a signed delta
//! - `GET  /api/users` / `POST /api/users` - kiosk accounts
//! - `GET  /api/sales` / `POST /api/sales` - order history and checkout
//! - `GET  /api/feedback` / `POST /api/feedback`
//! - `GET  /api/recommendations`           - trending + ai picks
//!
//! Failures are `{ "error": "..." }` with a fixed, user-facing message. The
//! underlying cause is logged with a correlation id and never echoed back.

mod feedback;
mod products;
mod recommendations;
mod sales;
mod users;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::rejection::JsonRejection,
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use kiosk_core::config::ServerConfig;
use kiosk_core::errors::ApplicationError;
use kiosk_core::recommendations::RecommendationEngine;
use kiosk_db::repositories::{
    FeedbackRepository, ProductRepository, SaleRepository, UserRepository,
};
use kiosk_db::DbPool;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::error;
use uuid::Uuid;

use crate::health;

#[derive(Clone)]
pub struct ApiState {
    pub products: Arc<dyn ProductRepository>,
    pub sales: Arc<dyn SaleRepository>,
    pub users: Arc<dyn UserRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub engine: RecommendationEngine,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub type ApiFailure = (StatusCode, Json<ApiError>);

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/products", get(products::list))
        .route("/api/products/update-quantity", post(products::update_quantity))
        .route("/api/products/{id}", get(products::get_by_id))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/sales", get(sales::list).post(sales::checkout))
        .route("/api/feedback", get(feedback::list).post(feedback::submit))
        .route("/api/recommendations", get(recommendations::recommend))
        .with_state(state)
}

/// Full application: health, JSON API, optional built UI and optional CORS
/// for a single browser origin.
pub fn app(state: ApiState, db_pool: DbPool, server: &ServerConfig) -> anyhow::Result<Router> {
    let mut app = health::router(db_pool).merge(router(state));

    if let Some(dir) = &server.static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        app = app.fallback_service(ServeDir::new(dir).fallback(index));
    }

    if let Some(origin) = &server.cors_origin {
        let origin = HeaderValue::from_str(origin)
            .with_context(|| format!("server.cors_origin `{origin}` is not a valid header value"))?;
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE]),
        );
    }

    Ok(app)
}

pub(crate) fn failure(status: StatusCode, message: impl Into<String>) -> ApiFailure {
    (status, Json(ApiError { error: message.into() }))
}

pub(crate) fn bad_json(rejection: JsonRejection) -> ApiFailure {
    failure(StatusCode::BAD_REQUEST, rejection.body_text())
}

/// Logs `cause` under a fresh correlation id and answers with a generic 500.
pub(crate) fn internal_failure(
    event_name: &'static str,
    cause: impl Into<ApplicationError>,
    public_message: &'static str,
) -> ApiFailure {
    let interface = cause.into().into_interface(Uuid::new_v4().to_string());
    error!(
        event_name,
        correlation_id = %interface.correlation_id(),
        error = %interface,
        "request failed"
    );
    failure(StatusCode::INTERNAL_SERVER_ERROR, public_message)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use kiosk_core::domain::product::Product;
    use kiosk_core::domain::sale::{Sale, SaleItem};
    use kiosk_core::domain::user::{KioskUser, UserRole};
    use kiosk_core::recommendations::{
        OracleReply, OracleSuggestion, RecommendationEngine, SuggestionOracle,
    };
    use kiosk_db::repositories::{
        InMemoryFeedbackRepository, InMemoryProductRepository, InMemorySaleRepository,
        InMemoryUserRepository,
    };
    use kiosk_db::{RepositoryCatalog, RepositoryLedger};
    use rust_decimal::Decimal;

    use super::ApiState;

    pub struct FixedOracle(pub Vec<OracleSuggestion>);

    #[async_trait]
    impl SuggestionOracle for FixedOracle {
        async fn suggest(&self, _prompt: &str) -> OracleReply {
            OracleReply::Parsed(self.0.clone())
        }
    }

    pub fn catalog() -> Vec<Product> {
        vec![
            Product::new("prod-coffee", "Coffee", Decimal::new(50, 0), 20),
            Product::new("prod-tea", "Tea", Decimal::new(40, 0), 25),
            Product::new("prod-chips", "Chips", Decimal::new(30, 0), 2),
        ]
    }

    pub fn user(admission_number: &str, wallet: i64) -> KioskUser {
        KioskUser {
            admission_number: admission_number.to_string(),
            name: format!("Student {admission_number}"),
            department: Some("CSE".to_string()),
            wallet_balance: Decimal::new(wallet, 0),
            role: UserRole::User,
            email: Some(format!("{admission_number}@example.com")),
        }
    }

    pub fn sale(user_id: &str, order_id: &str, items: Vec<SaleItem>) -> Sale {
        let mut sale = Sale::new(user_id, items);
        sale.order_id = order_id.to_string();
        sale
    }

    pub fn state_with(sales: Vec<Sale>, suggestions: Vec<OracleSuggestion>) -> ApiState {
        let products = Arc::new(InMemoryProductRepository::with_products(catalog()));
        let sales = Arc::new(InMemorySaleRepository::with_sales(sales));
        let engine = RecommendationEngine::new(
            Arc::new(RepositoryLedger::new(sales.clone())),
            Arc::new(RepositoryCatalog::new(products.clone())),
            Arc::new(FixedOracle(suggestions)),
        );

        ApiState {
            products,
            sales,
            users: Arc::new(InMemoryUserRepository::with_users(vec![user("19332", 500)])),
            feedback: Arc::new(InMemoryFeedbackRepository::default()),
            engine,
        }
    }

    pub fn state() -> ApiState {
        state_with(Vec::new(), Vec::new())
    }
}
