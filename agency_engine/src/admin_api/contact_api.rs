use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    admin_api::{contact_objects::ContactQueryFilter, errors::ContactApiError},
    db_types::{ContactStatus, ContactSubmission, NewContactSubmission},
    traits::{ContactManagement, StoreError},
};

/// Intake and listing of contact-form submissions.
pub struct ContactApi<B> {
    db: B,
}

impl<B: Debug> Debug for ContactApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContactApi ({:?})", self.db)
    }
}

impl<B> ContactApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ContactApi<B>
where B: ContactManagement
{
    /// Stores a new submission with the `pending` status.
    ///
    /// `name`, `email` and `message` are required. Surrounding whitespace is trimmed, and a blank phone number is
    /// stored as no phone number.
    pub async fn submit(&self, contact: NewContactSubmission) -> Result<ContactSubmission, ContactApiError> {
        let contact = normalize(contact);
        validate(&contact)?;
        let stored = self.db.insert_contact(contact, Utc::now()).await.map_err(|e| {
            error!("📨️ Could not save contact submission. {e}");
            ContactApiError::SubmitFailed
        })?;
        info!("📨️ New contact submission #{} received", stored.id);
        Ok(stored)
    }

    pub async fn list(&self, filter: ContactQueryFilter) -> Result<Vec<ContactSubmission>, ContactApiError> {
        trace!("📨️ Fetching contact submissions. {filter}");
        self.db.fetch_contacts(filter).await.map_err(|e| {
            error!("📨️ Could not load contact submissions. {e}");
            ContactApiError::LoadFailed
        })
    }

    /// Marks a submission as followed up (or back to `pending`). The status may be any non-blank word.
    pub async fn update_status(&self, id: i64, status: ContactStatus) -> Result<ContactSubmission, ContactApiError> {
        let status = ContactStatus::from(status.to_string().trim().to_string());
        if status.to_string().is_empty() {
            return Err(ContactApiError::ValidationError("Please choose a status".into()));
        }
        let updated = self.db.update_contact_status(id, status).await.map_err(|e| match e {
            StoreError::RecordNotFound { id, .. } => ContactApiError::ContactNotFound(id),
            e => {
                error!("📨️ Could not update contact submission #{id}. {e}");
                ContactApiError::UpdateFailed
            },
        })?;
        info!("📨️ Contact submission #{id} marked as {}", updated.status);
        Ok(updated)
    }
}

fn normalize(contact: NewContactSubmission) -> NewContactSubmission {
    let phone = contact.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    NewContactSubmission {
        name: contact.name.trim().to_string(),
        email: contact.email.trim().to_string(),
        phone,
        message: contact.message.trim().to_string(),
    }
}

fn validate(contact: &NewContactSubmission) -> Result<(), ContactApiError> {
    if contact.name.is_empty() || contact.email.is_empty() || contact.message.is_empty() {
        return Err(ContactApiError::ValidationError("Please fill in all required fields".into()));
    }
    if !contact.email.contains('@') {
        return Err(ContactApiError::ValidationError("Please enter a valid email address".into()));
    }
    Ok(())
}
