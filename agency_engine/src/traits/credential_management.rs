use chrono::{DateTime, Utc};

use crate::{
    admin_api::credential_objects::CredentialQueryFilter,
    db_types::{CredentialUpdate, NewPaymentCredential, PaymentCredential},
    traits::StoreError,
};

/// The `CredentialManagement` trait defines the store operations on the `payment_settings` collection.
///
/// Backends do not validate the records they are given. [`CredentialApi`](crate::CredentialApi) guarantees that keys
/// are non-empty before calling through.
#[allow(async_fn_in_trait)]
pub trait CredentialManagement {
    /// Fetches the credentials matching `filter`, most recently created first, returning at most `filter.limit`
    /// records.
    async fn fetch_credentials(&self, filter: CredentialQueryFilter) -> Result<Vec<PaymentCredential>, StoreError>;

    /// Fetches a single credential. Returns `None` if no record with the given id exists.
    async fn fetch_credential(&self, id: i64) -> Result<Option<PaymentCredential>, StoreError>;

    /// Stores a new credential, stamping both `created_at` and `updated_at` with `now`, and returns the stored record
    /// including its newly assigned id.
    async fn insert_credential(
        &self,
        credential: NewPaymentCredential,
        now: DateTime<Utc>,
    ) -> Result<PaymentCredential, StoreError>;

    /// Applies the non-`None` fields of `update` and sets `updated_at` to `now`. `created_at` is never modified.
    /// Fails with [`StoreError::RecordNotFound`] if the id does not exist.
    async fn update_credential(
        &self,
        id: i64,
        update: CredentialUpdate,
        now: DateTime<Utc>,
    ) -> Result<PaymentCredential, StoreError>;

    /// Permanently removes the credential and returns the record as it was before deletion.
    /// Fails with [`StoreError::RecordNotFound`] if the id does not exist.
    async fn delete_credential(&self, id: i64) -> Result<PaymentCredential, StoreError>;
}
