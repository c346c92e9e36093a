use rust_decimal::Decimal;
use tokio::sync::RwLock;

use kiosk_core::domain::feedback::Feedback;
use kiosk_core::domain::product::{Product, ProductId};
use kiosk_core::domain::sale::Sale;
use kiosk_core::domain::user::KioskUser;

use super::{
    apply_stock_delta, FeedbackRepository, ProductRepository, RepositoryError, SaleRepository,
    StockAdjustment, UserRepository,
};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| product.name == name).cloned())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    async fn adjust_quantity(
        &self,
        id: &ProductId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError> {
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|product| &product.id == id) else {
            return Ok(StockAdjustment::NotFound);
        };

        match apply_stock_delta(product.quantity, delta) {
            Ok(new_quantity) => {
                product.quantity = new_quantity;
                Ok(StockAdjustment::Updated { new_quantity })
            }
            Err(refusal) => Ok(refusal),
        }
    }
}

#[derive(Default)]
pub struct InMemorySaleRepository {
    sales: RwLock<Vec<Sale>>,
}

impl InMemorySaleRepository {
    pub fn with_sales(sales: Vec<Sale>) -> Self {
        Self { sales: RwLock::new(sales) }
    }
}

#[async_trait::async_trait]
impl SaleRepository for InMemorySaleRepository {
    async fn list_all(&self) -> Result<Vec<Sale>, RepositoryError> {
        Ok(self.sales.read().await.clone())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Sale>, RepositoryError> {
        let sales = self.sales.read().await;
        Ok(sales.iter().filter(|sale| sale.user_id == user_id).cloned().collect())
    }

    async fn record(&self, sale: Sale) -> Result<(), RepositoryError> {
        let mut sales = self.sales.write().await;
        if sales.iter().any(|existing| existing.order_id == sale.order_id) {
            return Err(RepositoryError::Conflict(format!(
                "order `{}` already recorded",
                sale.order_id
            )));
        }
        sales.push(sale);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<KioskUser>>,
}

impl InMemoryUserRepository {
    pub fn with_users(users: Vec<KioskUser>) -> Self {
        Self { users: RwLock::new(users) }
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list_all(&self) -> Result<Vec<KioskUser>, RepositoryError> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_admission_number(
        &self,
        admission_number: &str,
    ) -> Result<Option<KioskUser>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|user| user.admission_number == admission_number).cloned())
    }

    async fn create(&self, user: KioskUser) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.iter().any(|existing| existing.admission_number == user.admission_number) {
            return Err(RepositoryError::Conflict(format!(
                "user `{}` already exists",
                user.admission_number
            )));
        }
        users.push(user);
        Ok(())
    }

    async fn replace_all(&self, users: Vec<KioskUser>) -> Result<(), RepositoryError> {
        *self.users.write().await = users;
        Ok(())
    }

    async fn adjust_wallet_balance(
        &self,
        admission_number: &str,
        delta: Decimal,
    ) -> Result<Option<Decimal>, RepositoryError> {
        let mut users = self.users.write().await;
        Ok(users.iter_mut().find(|user| user.admission_number == admission_number).map(|user| {
            user.wallet_balance += delta;
            user.wallet_balance
        }))
    }
}

#[derive(Default)]
pub struct InMemoryFeedbackRepository {
    entries: RwLock<Vec<Feedback>>,
}

#[async_trait::async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn submit(&self, feedback: Feedback) -> Result<(), RepositoryError> {
        self.entries.write().await.push(feedback);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Feedback>, RepositoryError> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        entries.truncate(limit as usize);
        Ok(entries)
    }
}
