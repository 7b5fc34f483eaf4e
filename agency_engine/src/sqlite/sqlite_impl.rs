//! `SqliteDatabase` is the bundled entity store backend.
//!
//! It implements every trait in [`crate::traits`], so a single instance can back all the admin APIs.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{contacts, credentials, new_pool, transactions};
use crate::{
    admin_api::{contact_objects::ContactQueryFilter, credential_objects::CredentialQueryFilter},
    db_types::{
        ContactStatus,
        ContactSubmission,
        CredentialUpdate,
        NewContactSubmission,
        NewPaymentCredential,
        PaymentCredential,
        Transaction,
    },
    traits::{ContactManagement, CredentialManagement, StoreError, TransactionManagement},
};

const CREDENTIALS: &str = "payment_settings";
const CONTACTS: &str = "contact_submissions";

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl CredentialManagement for SqliteDatabase {
    async fn fetch_credentials(&self, filter: CredentialQueryFilter) -> Result<Vec<PaymentCredential>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = credentials::fetch_credentials(filter, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_credential(&self, id: i64) -> Result<Option<PaymentCredential>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = credentials::fetch_credential(id, &mut conn).await?;
        Ok(result)
    }

    async fn insert_credential(
        &self,
        credential: NewPaymentCredential,
        now: DateTime<Utc>,
    ) -> Result<PaymentCredential, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = credentials::insert_credential(credential, now, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn update_credential(
        &self,
        id: i64,
        update: CredentialUpdate,
        now: DateTime<Utc>,
    ) -> Result<PaymentCredential, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = credentials::update_credential(id, update, now, &mut tx)
            .await?
            .ok_or_else(|| StoreError::not_found(CREDENTIALS, id))?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_credential(&self, id: i64) -> Result<PaymentCredential, StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted =
            credentials::delete_credential(id, &mut tx).await?.ok_or_else(|| StoreError::not_found(CREDENTIALS, id))?;
        tx.commit().await?;
        debug!("🗃️ Payment setting #{id} removed from the database");
        Ok(deleted)
    }
}

impl ContactManagement for SqliteDatabase {
    async fn fetch_contacts(&self, filter: ContactQueryFilter) -> Result<Vec<ContactSubmission>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = contacts::fetch_contacts(filter, &mut conn).await?;
        Ok(result)
    }

    async fn insert_contact(
        &self,
        contact: NewContactSubmission,
        now: DateTime<Utc>,
    ) -> Result<ContactSubmission, StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = contacts::insert_contact(contact, now, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Contact submission #{} saved", result.id);
        Ok(result)
    }

    async fn update_contact_status(&self, id: i64, status: ContactStatus) -> Result<ContactSubmission, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = contacts::update_contact_status(id, status, &mut tx)
            .await?
            .ok_or_else(|| StoreError::not_found(CONTACTS, id))?;
        tx.commit().await?;
        debug!("🗃️ Contact submission #{id} is now {}", updated.status);
        Ok(updated)
    }
}

impl TransactionManagement for SqliteDatabase {
    async fn fetch_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = transactions::fetch_transactions(limit, &mut conn).await?;
        Ok(result)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
