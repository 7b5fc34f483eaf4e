use std::fmt::Display;

use agency_engine::{
    contact_objects::ContactQueryFilter,
    credential_objects::CredentialView,
    db_types::{ContactStatus, ContactSubmission},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialList {
    pub credentials: Vec<CredentialView>,
}

/// Returned by every credential mutation: the changed record, and the refreshed list when it could be loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialMutation {
    pub success: bool,
    pub message: String,
    pub credential: CredentialView,
    pub credentials: Option<Vec<CredentialView>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealResult {
    pub id: i64,
    pub secret_revealed: bool,
    pub credential: CredentialView,
}

/// The confirmation step of a deletion. Nothing has been deleted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionRequest {
    pub ticket: String,
    pub expires_at: DateTime<Utc>,
    pub message: String,
    pub credential: CredentialView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmDeletionParams {
    pub ticket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactStatusUpdate {
    pub status: ContactStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactStatusChanged {
    pub success: bool,
    pub message: String,
    pub contact: ContactSubmission,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactListParams {
    pub status: Option<String>,
    pub limit: Option<u32>,
}

impl From<ContactListParams> for ContactQueryFilter {
    fn from(params: ContactListParams) -> Self {
        let mut filter = ContactQueryFilter::default();
        if let Some(status) = params.status.filter(|s| !s.is_empty()) {
            filter = filter.with_status(ContactStatus::from(status));
        }
        if let Some(limit) = params.limit {
            filter = filter.with_limit(limit);
        }
        filter
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackParams {
    pub token: String,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub sub: String,
    pub email: String,
}
