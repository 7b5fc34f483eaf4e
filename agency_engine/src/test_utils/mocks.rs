use chrono::{DateTime, Utc};
use mockall::mock;

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

mock! {
    pub Store {}
    impl CredentialManagement for Store {
        async fn fetch_credentials(&self, filter: CredentialQueryFilter) -> Result<Vec<PaymentCredential>, StoreError>;
        async fn fetch_credential(&self, id: i64) -> Result<Option<PaymentCredential>, StoreError>;
        async fn insert_credential(&self, credential: NewPaymentCredential, now: DateTime<Utc>) -> Result<PaymentCredential, StoreError>;
        async fn update_credential(&self, id: i64, update: CredentialUpdate, now: DateTime<Utc>) -> Result<PaymentCredential, StoreError>;
        async fn delete_credential(&self, id: i64) -> Result<PaymentCredential, StoreError>;
    }
    impl ContactManagement for Store {
        async fn fetch_contacts(&self, filter: ContactQueryFilter) -> Result<Vec<ContactSubmission>, StoreError>;
        async fn insert_contact(&self, contact: NewContactSubmission, now: DateTime<Utc>) -> Result<ContactSubmission, StoreError>;
        async fn update_contact_status(&self, id: i64, status: ContactStatus) -> Result<ContactSubmission, StoreError>;
    }
    impl TransactionManagement for Store {
        async fn fetch_transactions(&self, limit: u32) -> Result<Vec<Transaction>, StoreError>;
    }
}
