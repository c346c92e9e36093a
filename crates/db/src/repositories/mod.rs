use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use kiosk_core::domain::feedback::Feedback;
use kiosk_core::domain::product::{Product, ProductId};
use kiosk_core::domain::sale::Sale;
use kiosk_core::domain::user::KioskUser;
use kiosk_core::errors::ApplicationError;

pub mod feedback;
pub mod memory;
pub mod product;
pub mod sale;
pub mod user;

pub use feedback::SqlFeedbackRepository;
pub use memory::{
    InMemoryFeedbackRepository, InMemoryProductRepository, InMemorySaleRepository,
    InMemoryUserRepository,
};
pub use product::SqlProductRepository;
pub use sale::SqlSaleRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Persistence(value.to_string())
    }
}

/// Result of moving a product's stock by a signed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockAdjustment {
    Updated { new_quantity: u32 },
    NotFound,
    Insufficient { available: u32 },
    /// The new level would not fit a `u32` stock count.
    OverCapacity { available: u32 },
}

/// New stock level for `current + delta`, or the refusal to report when it
/// falls outside `0..=u32::MAX`.
pub(crate) fn apply_stock_delta(current: u32, delta: i64) -> Result<u32, StockAdjustment> {
    match i64::from(current).checked_add(delta) {
        Some(next) if next < 0 => Err(StockAdjustment::Insufficient { available: current }),
        Some(next) => {
            u32::try_from(next).map_err(|_| StockAdjustment::OverCapacity { available: current })
        }
        None => Err(StockAdjustment::OverCapacity { available: current }),
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product in catalog insertion order.
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError>;
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
    /// Applies `delta` unless the result would drop below zero or exceed
    /// `u32::MAX`; refused deltas leave the stock untouched.
    async fn adjust_quantity(
        &self,
        id: &ProductId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError>;
}

#[async_trait]
pub trait SaleRepository: Send + Sync {
    /// Every sale in recording order.
    async fn list_all(&self) -> Result<Vec<Sale>, RepositoryError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Sale>, RepositoryError>;
    /// Stores the sale with its lines; a repeated `order_id` is a conflict.
    async fn record(&self, sale: Sale) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<KioskUser>, RepositoryError>;
    async fn find_by_admission_number(
        &self,
        admission_number: &str,
    ) -> Result<Option<KioskUser>, RepositoryError>;
    /// Inserts a new user; an existing admission number is a conflict.
    async fn create(&self, user: KioskUser) -> Result<(), RepositoryError>;
    /// Drops every user and inserts `users`.
    async fn replace_all(&self, users: Vec<KioskUser>) -> Result<(), RepositoryError>;
    /// Adds `delta` to the wallet and returns the new balance, or `None`
    /// when the user does not exist. Concurrent adjustments serialize.
    async fn adjust_wallet_balance(
        &self,
        admission_number: &str,
        delta: Decimal,
    ) -> Result<Option<Decimal>, RepositoryError>;
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn submit(&self, feedback: Feedback) -> Result<(), RepositoryError>;
    /// Newest first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Feedback>, RepositoryError>;
}

pub(crate) fn decode_err(error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

pub(crate) fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("{column} `{raw}` is not a decimal: {error}")))
}

pub(crate) fn to_u32(column: &str, raw: i64) -> Result<u32, RepositoryError> {
    u32::try_from(raw)
        .map_err(|_| RepositoryError::Decode(format!("{column} `{raw}` is out of range")))
}
