use rust_decimal::Decimal;
use sqlx::Row;

use kiosk_core::domain::user::{KioskUser, UserRole};

use super::{decode_err, parse_decimal, RepositoryError, UserRepository};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<KioskUser, RepositoryError> {
    let wallet_balance: String = row.try_get("wallet_balance").map_err(decode_err)?;
    let role: String = row.try_get("role").map_err(decode_err)?;

    Ok(KioskUser {
        admission_number: row.try_get("admission_number").map_err(decode_err)?,
        name: row.try_get("name").map_err(decode_err)?,
        department: row.try_get("department").map_err(decode_err)?,
        wallet_balance: parse_decimal("wallet_balance", &wallet_balance)?,
        role: UserRole::parse(&role),
        email: row.try_get("email").map_err(decode_err)?,
    })
}

async fn insert_user<'e, E>(executor: E, user: &KioskUser) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        "INSERT INTO kiosk_user (admission_number, name, department, wallet_balance, role, email)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.admission_number)
    .bind(&user.name)
    .bind(&user.department)
    .bind(user.wallet_balance.to_string())
    .bind(user.role.as_str())
    .bind(&user.email)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn list_all(&self) -> Result<Vec<KioskUser>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT admission_number, name, department, wallet_balance, role, email
             FROM kiosk_user ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_admission_number(
        &self,
        admission_number: &str,
    ) -> Result<Option<KioskUser>, RepositoryError> {
        let row = sqlx::query(
            "SELECT admission_number, name, department, wallet_balance, role, email
             FROM kiosk_user WHERE admission_number = ?",
        )
        .bind(admission_number)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, user: KioskUser) -> Result<(), RepositoryError> {
        match insert_user(&self.pool, &user).await {
            Ok(()) => Ok(()),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(RepositoryError::Conflict(format!(
                    "user `{}` already exists",
                    user.admission_number
                )))
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn replace_all(&self, users: Vec<KioskUser>) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM kiosk_user").execute(&mut *tx).await?;
        for user in &users {
            insert_user(&mut *tx, user).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn adjust_wallet_balance(
        &self,
        admission_number: &str,
        delta: Decimal,
    ) -> Result<Option<Decimal>, RepositoryError> {
        // Write lock up front; a deferred read cannot upgrade past a newer WAL snapshot.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT wallet_balance FROM kiosk_user WHERE admission_number = ?")
                .bind(admission_number)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let balance = parse_decimal("wallet_balance", &current)? + delta;
        sqlx::query("UPDATE kiosk_user SET wallet_balance = ? WHERE admission_number = ?")
            .bind(balance.to_string())
            .bind(admission_number)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(balance))
    }
}
