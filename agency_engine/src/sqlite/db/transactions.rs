use sqlx::{sqlite::SqliteRow, FromRow, Row, SqliteConnection};

use crate::db_types::{Transaction, TransactionStatus};

impl FromRow<'_, SqliteRow> for Transaction {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Self {
            id: row.try_get("id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            status: TransactionStatus::from(status),
            payment_method: row.try_get("payment_method")?,
            external_id: row.try_get("external_id")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// The most recent `limit` transactions, regardless of status.
pub async fn fetch_transactions(limit: u32, conn: &mut SqliteConnection) -> Result<Vec<Transaction>, sqlx::Error> {
    let transactions = sqlx::query_as("SELECT * FROM transactions ORDER BY created_at DESC, id DESC LIMIT $1")
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(transactions)
}
