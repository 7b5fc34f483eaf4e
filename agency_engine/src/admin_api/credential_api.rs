//! The credential manager: lifecycle of payment-provider API keys.

use std::{fmt::Debug, sync::Arc};

use chrono::Utc;
use log::*;
use tokio::sync::Mutex;

use crate::{
    admin_api::{
        credential_objects::{CredentialQueryFilter, CredentialsRefreshed, PendingDeletion},
        errors::CredentialApiError,
    },
    db_types::{CredentialUpdate, NewPaymentCredential, PaymentCredential},
    traits::{CredentialManagement, StoreError},
};

/// `CredentialApi` lists, creates, edits, toggles and deletes [`PaymentCredential`] records.
///
/// Every mutation is followed by a full re-read of the list, which is returned alongside the changed record. This is
/// fine for the handful of records an admin manages.
///
/// Clones share a write lock, so mutations issued through any clone are applied one at a time.
#[derive(Clone)]
pub struct CredentialApi<B> {
    db: B,
    write_lock: Arc<Mutex<()>>,
}

impl<B: Debug> Debug for CredentialApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CredentialApi ({:?})", self.db)
    }
}

impl<B> CredentialApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, write_lock: Arc::new(Mutex::new(())) }
    }
}

impl<B> CredentialApi<B>
where B: CredentialManagement
{
    /// Fetches all credentials, most recently created first, up to [`MAX_CREDENTIALS`] records.
    ///
    /// An empty list means nothing has been configured yet. It is not an error.
    ///
    /// [`MAX_CREDENTIALS`]: crate::admin_api::credential_objects::MAX_CREDENTIALS
    pub async fn list(&self) -> Result<Vec<PaymentCredential>, CredentialApiError> {
        self.db.fetch_credentials(CredentialQueryFilter::default()).await.map_err(|e| {
            error!("🔑️ Failed to load payment settings. {e}");
            CredentialApiError::LoadFailed
        })
    }

    pub async fn fetch(&self, id: i64) -> Result<PaymentCredential, CredentialApiError> {
        self.db
            .fetch_credential(id)
            .await
            .map_err(|e| store_failure(e, "load", CredentialApiError::LoadFailed))?
            .ok_or(CredentialApiError::CredentialNotFound(id))
    }

    /// Stores a new credential.
    ///
    /// Both keys must be non-empty. If either is missing, a validation error is returned and the store is never
    /// called.
    pub async fn create(&self, credential: NewPaymentCredential) -> Result<CredentialsRefreshed, CredentialApiError> {
        if !credential.has_required_fields() {
            debug!("🔑️ Rejected new {} credential with missing keys", credential.provider);
            return Err(CredentialApiError::missing_fields());
        }
        let _guard = self.write_lock.lock().await;
        let provider = credential.provider;
        let created = self.db.insert_credential(credential, Utc::now()).await.map_err(|e| {
            error!("🔑️ Failed to save new {provider} payment setting. {e}");
            CredentialApiError::SaveFailed
        })?;
        info!("🔑️ Payment setting #{} created for {} ({})", created.id, created.provider, created.environment);
        Ok(self.refreshed(created).await)
    }

    /// Replaces the editable fields of credential `id` with `credential`.
    ///
    /// Validation is the same as for [`Self::create`]. `updated_at` is refreshed and `created_at` is left as is.
    pub async fn update(
        &self,
        id: i64,
        credential: NewPaymentCredential,
    ) -> Result<CredentialsRefreshed, CredentialApiError> {
        if !credential.has_required_fields() {
            debug!("🔑️ Rejected update to payment setting #{id} with missing keys");
            return Err(CredentialApiError::missing_fields());
        }
        let _guard = self.write_lock.lock().await;
        let update = CredentialUpdate::from(credential);
        let updated = self
            .db
            .update_credential(id, update, Utc::now())
            .await
            .map_err(|e| store_failure(e, "save", CredentialApiError::SaveFailed))?;
        info!("🔑️ Payment setting #{id} updated");
        Ok(self.refreshed(updated).await)
    }

    /// Flips the `is_active` flag of credential `id`. Nothing else about the record changes apart from `updated_at`.
    pub async fn toggle_active(&self, id: i64) -> Result<CredentialsRefreshed, CredentialApiError> {
        let _guard = self.write_lock.lock().await;
        let current = self
            .db
            .fetch_credential(id)
            .await
            .map_err(|e| store_failure(e, "toggle", CredentialApiError::ToggleFailed))?
            .ok_or(CredentialApiError::CredentialNotFound(id))?;
        let update = CredentialUpdate::default().with_is_active(!current.is_active);
        let updated = self
            .db
            .update_credential(id, update, Utc::now())
            .await
            .map_err(|e| store_failure(e, "toggle", CredentialApiError::ToggleFailed))?;
        let state = if updated.is_active { "activated" } else { "deactivated" };
        info!("🔑️ Payment setting #{id} {state}");
        Ok(self.refreshed(updated).await)
    }

    /// First half of a deletion: looks up the credential and hands back a [`PendingDeletion`] for the admin to
    /// confirm. Nothing is deleted yet.
    pub async fn request_deletion(&self, id: i64) -> Result<PendingDeletion, CredentialApiError> {
        let credential = self
            .db
            .fetch_credential(id)
            .await
            .map_err(|e| store_failure(e, "load", CredentialApiError::LoadFailed))?
            .ok_or(CredentialApiError::CredentialNotFound(id))?;
        debug!("🔑️ Deletion of payment setting #{id} is awaiting confirmation");
        Ok(PendingDeletion::new(credential))
    }

    /// Second half of a deletion: permanently removes the credential. There is no undo.
    pub async fn confirm_deletion(&self, pending: PendingDeletion) -> Result<CredentialsRefreshed, CredentialApiError> {
        let _guard = self.write_lock.lock().await;
        let id = pending.id();
        let deleted = self
            .db
            .delete_credential(id)
            .await
            .map_err(|e| store_failure(e, "delete", CredentialApiError::DeleteFailed))?;
        info!("🔑️ Payment setting #{id} ({}) deleted", deleted.provider);
        Ok(self.refreshed(deleted).await)
    }

    async fn refreshed(&self, changed: PaymentCredential) -> CredentialsRefreshed {
        let credentials = match self.list().await {
            Ok(list) => Some(list),
            Err(e) => {
                warn!("🔑️ Payment setting #{} was changed, but the list could not be refreshed. {e}", changed.id);
                None
            },
        };
        CredentialsRefreshed { changed, credentials }
    }
}

fn store_failure(e: StoreError, action: &str, generic: CredentialApiError) -> CredentialApiError {
    match e {
        StoreError::RecordNotFound { id, .. } => {
            debug!("🔑️ Could not {action} payment setting #{id}. It does not exist.");
            CredentialApiError::CredentialNotFound(id)
        },
        e => {
            error!("🔑️ Could not {action} payment setting. {e}");
            generic
        },
    }
}
