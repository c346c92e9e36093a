use sqlx::Row;

use kiosk_core::domain::product::{Product, ProductId};

use super::{
    apply_stock_delta, decode_err, parse_decimal, to_u32, ProductRepository, RepositoryError,
    StockAdjustment,
};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, sku, name, price, quantity, description, image, category, \
                               ingredients, allergens";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(decode_err)?;
    let price: String = row.try_get("price").map_err(decode_err)?;
    let quantity: i64 = row.try_get("quantity").map_err(decode_err)?;

    Ok(Product {
        id: ProductId(id),
        sku: row.try_get("sku").map_err(decode_err)?,
        name: row.try_get("name").map_err(decode_err)?,
        price: parse_decimal("price", &price)?,
        quantity: to_u32("quantity", quantity)?,
        description: row.try_get("description").map_err(decode_err)?,
        image: row.try_get("image").map_err(decode_err)?,
        category: row.try_get("category").map_err(decode_err)?,
        ingredients: row.try_get("ingredients").map_err(decode_err)?,
        allergens: row.try_get("allergens").map_err(decode_err)?,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY rowid"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE name = ?"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product (id, sku, name, price, quantity, description, image, category,
                                  ingredients, allergens)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 sku = excluded.sku,
                 name = excluded.name,
                 price = excluded.price,
                 quantity = excluded.quantity,
                 description = excluded.description,
                 image = excluded.image,
                 category = excluded.category,
                 ingredients = excluded.ingredients,
                 allergens = excluded.allergens,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        )
        .bind(product.id.as_str())
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price.to_string())
        .bind(i64::from(product.quantity))
        .bind(&product.description)
        .bind(&product.image)
        .bind(&product.category)
        .bind(&product.ingredients)
        .bind(&product.allergens)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn adjust_quantity(
        &self,
        id: &ProductId,
        delta: i64,
    ) -> Result<StockAdjustment, RepositoryError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let current: Option<i64> = sqlx::query_scalar("SELECT quantity FROM product WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current else {
            return Ok(StockAdjustment::NotFound);
        };

        let new_quantity = match apply_stock_delta(to_u32("quantity", current)?, delta) {
            Ok(new_quantity) => new_quantity,
            Err(refusal) => return Ok(refusal),
        };

        sqlx::query(
            "UPDATE product
             SET quantity = ?,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE id = ?",
        )
        .bind(i64::from(new_quantity))
        .bind(id.as_str())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(StockAdjustment::Updated { new_quantity })
    }
}
