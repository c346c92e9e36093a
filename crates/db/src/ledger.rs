//! Repository adapters for the recommendation engine's read-only seams.

use std::sync::Arc;

use async_trait::async_trait;
use kiosk_core::domain::product::Product;
use kiosk_core::domain::sale::Sale;
use kiosk_core::errors::ApplicationError;
use kiosk_core::recommendations::{CatalogStore, SalesLedger};

use crate::repositories::{ProductRepository, SaleRepository};

#[derive(Clone)]
pub struct RepositoryLedger {
    sales: Arc<dyn SaleRepository>,
}

impl RepositoryLedger {
    pub fn new(sales: Arc<dyn SaleRepository>) -> Self {
        Self { sales }
    }
}

#[async_trait]
impl SalesLedger for RepositoryLedger {
    async fn list_all_sales(&self) -> Result<Vec<Sale>, ApplicationError> {
        Ok(self.sales.list_all().await?)
    }
}

#[derive(Clone)]
pub struct RepositoryCatalog {
    products: Arc<dyn ProductRepository>,
}

impl RepositoryCatalog {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CatalogStore for RepositoryCatalog {
    async fn list_all_products(&self) -> Result<Vec<Product>, ApplicationError> {
        Ok(self.products.list_all().await?)
    }
}
