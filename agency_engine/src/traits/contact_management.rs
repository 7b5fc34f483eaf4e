use chrono::{DateTime, Utc};

use crate::{
    admin_api::contact_objects::ContactQueryFilter,
    db_types::{ContactStatus, ContactSubmission, NewContactSubmission},
    traits::StoreError,
};

#[allow(async_fn_in_trait)]
pub trait ContactManagement {
    /// Fetches contact submissions matching `filter`, newest first, up to `filter.limit` records.
    async fn fetch_contacts(&self, filter: ContactQueryFilter) -> Result<Vec<ContactSubmission>, StoreError>;

    /// Appends a new submission with the `pending` status.
    async fn insert_contact(
        &self,
        contact: NewContactSubmission,
        now: DateTime<Utc>,
    ) -> Result<ContactSubmission, StoreError>;

    /// Records an admin's follow-up on a submission. Moving a submission out of `pending` removes it from the
    /// dashboard's pending count.
    async fn update_contact_status(&self, id: i64, status: ContactStatus) -> Result<ContactSubmission, StoreError>;
}
