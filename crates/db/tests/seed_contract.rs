use std::collections::HashSet;
use std::sync::Arc;

use kiosk_core::recommendations::{CatalogStore, SalesLedger};
use kiosk_db::repositories::{
    ProductRepository, SaleRepository, SqlProductRepository, SqlSaleRepository,
};
use kiosk_db::{connect_with_settings, migrations, CanteenSeedDataset, RepositoryCatalog, RepositoryLedger};

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

async fn seeded_pool() -> SeedContractTestResult<kiosk_db::DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    CanteenSeedDataset::load(&pool).await.map_err(|error| format!("seed: {error}"))?;
    Ok(pool)
}

#[tokio::test]
async fn every_seeded_product_id_resolves() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let products = SqlProductRepository::new(pool);

    for id in CanteenSeedDataset::product_ids() {
        let found = products.find_by_id(&id).await.map_err(|error| error.to_string())?;
        require!(found.is_some(), "seed product `{id}` should be present");
    }
    Ok(())
}

#[tokio::test]
async fn seeded_catalog_has_unique_names_and_positive_prices() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let catalog = RepositoryCatalog::new(Arc::new(SqlProductRepository::new(pool)));

    let products = catalog.list_all_products().await.map_err(|error| error.to_string())?;
    let names: HashSet<&str> = products.iter().map(|product| product.name.as_str()).collect();

    require!(products.len() == 8, "expected 8 seeded products, found {}", products.len());
    require!(names.len() == products.len(), "product names should be unique");
    require!(products.iter().all(|product| product.price.is_sign_positive()));
    require!(products[0].name == "Coffee", "catalog order should follow seed order");
    Ok(())
}

#[tokio::test]
async fn seeding_leaves_the_ledger_empty() -> SeedContractTestResult {
    let pool = seeded_pool().await?;
    let repo: Arc<dyn SaleRepository> = Arc::new(SqlSaleRepository::new(pool));
    let ledger = RepositoryLedger::new(repo.clone());

    let sales = ledger.list_all_sales().await.map_err(|error| error.to_string())?;
    let history = repo.list_for_user("19332").await.map_err(|error| error.to_string())?;

    require!(sales.is_empty());
    require!(history.is_empty());
    Ok(())
}
