use crate::{db_types::Transaction, traits::StoreError};

#[allow(async_fn_in_trait)]
pub trait TransactionManagement {
    /// Fetches up to `limit` transactions, without any filter.
    async fn fetch_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError>;
}
