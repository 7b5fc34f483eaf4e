use thiserror::Error;

/// Errors reported by [`CredentialApi`](crate::CredentialApi).
///
/// Store failures are deliberately generic. The underlying [`StoreError`](crate::traits::StoreError) is logged where
/// it occurs and never carried in the error itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Payment setting {0} does not exist")]
    CredentialNotFound(i64),
    #[error("Failed to load payment settings")]
    LoadFailed,
    #[error("Failed to save payment setting")]
    SaveFailed,
    #[error("Failed to update payment setting")]
    ToggleFailed,
    #[error("Failed to delete payment setting")]
    DeleteFailed,
}

impl CredentialApiError {
    pub fn missing_fields() -> Self {
        Self::ValidationError("Please fill in all required fields".into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Failed to send message. Please try again.")]
    SubmitFailed,
    #[error("Failed to load contact submissions")]
    LoadFailed,
    #[error("Contact submission {0} does not exist")]
    ContactNotFound(i64),
    #[error("Failed to update contact submission")]
    UpdateFailed,
}
