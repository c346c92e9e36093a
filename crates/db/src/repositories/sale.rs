use std::collections::HashMap;

use sqlx::Row;

use kiosk_core::domain::sale::{Sale, SaleItem};

use super::{decode_err, parse_decimal, to_u32, RepositoryError, SaleRepository};
use crate::DbPool;

pub struct SqlSaleRepository {
    pool: DbPool,
}

impl SqlSaleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(&self, user_id: Option<&str>) -> Result<Vec<Sale>, RepositoryError> {
        let (sale_rows, item_rows) = match user_id {
            Some(user_id) => {
                let sales = sqlx::query(
                    "SELECT seq, order_id, user_id, user_email, total, timestamp
                     FROM sale WHERE user_id = ? ORDER BY seq",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
                let items = sqlx::query(
                    "SELECT i.sale_seq, i.product_id, i.name, i.quantity, i.price
                     FROM sale_item i JOIN sale s ON s.seq = i.sale_seq
                     WHERE s.user_id = ?
                     ORDER BY i.sale_seq, i.position",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
                (sales, items)
            }
            None => {
                let sales = sqlx::query(
                    "SELECT seq, order_id, user_id, user_email, total, timestamp
                     FROM sale ORDER BY seq",
                )
                .fetch_all(&self.pool)
                .await?;
                let items = sqlx::query(
                    "SELECT sale_seq, product_id, name, quantity, price
                     FROM sale_item ORDER BY sale_seq, position",
                )
                .fetch_all(&self.pool)
                .await?;
                (sales, items)
            }
        };

        let mut items_by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
        for row in &item_rows {
            let sale_seq: i64 = row.try_get("sale_seq").map_err(decode_err)?;
            items_by_sale.entry(sale_seq).or_default().push(row_to_item(row)?);
        }

        sale_rows
            .iter()
            .map(|row| {
                let seq: i64 = row.try_get("seq").map_err(decode_err)?;
                row_to_sale(row, items_by_sale.remove(&seq).unwrap_or_default())
            })
            .collect()
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<SaleItem, RepositoryError> {
    let quantity: i64 = row.try_get("quantity").map_err(decode_err)?;
    let price: String = row.try_get("price").map_err(decode_err)?;

    Ok(SaleItem {
        id: row.try_get("product_id").map_err(decode_err)?,
        name: row.try_get("name").map_err(decode_err)?,
        quantity: to_u32("quantity", quantity)?,
        price: parse_decimal("price", &price)?,
    })
}

fn row_to_sale(
    row: &sqlx::sqlite::SqliteRow,
    items: Vec<SaleItem>,
) -> Result<Sale, RepositoryError> {
    let total: String = row.try_get("total").map_err(decode_err)?;

    Ok(Sale {
        order_id: row.try_get("order_id").map_err(decode_err)?,
        user_id: row.try_get("user_id").map_err(decode_err)?,
        user_email: row.try_get("user_email").map_err(decode_err)?,
        items,
        total: parse_decimal("total", &total)?,
        timestamp: row.try_get("timestamp").map_err(decode_err)?,
    })
}

#[async_trait::async_trait]
impl SaleRepository for SqlSaleRepository {
    async fn list_all(&self) -> Result<Vec<Sale>, RepositoryError> {
        self.load(None).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Sale>, RepositoryError> {
        self.load(Some(user_id)).await
    }

    async fn record(&self, sale: Sale) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let seq = sqlx::query(
            "INSERT INTO sale (order_id, user_id, user_email, total, timestamp)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&sale.order_id)
        .bind(&sale.user_id)
        .bind(&sale.user_email)
        .bind(sale.total.to_string())
        .bind(sale.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                RepositoryError::Conflict(format!("order `{}` already recorded", sale.order_id))
            }
            other => other.into(),
        })?
        .last_insert_rowid();

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO sale_item (sale_seq, position, product_id, name, quantity, price)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(seq)
            .bind(position as i64)
            .bind(&item.id)
            .bind(&item.name)
            .bind(i64::from(item.quantity))
            .bind(item.price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
