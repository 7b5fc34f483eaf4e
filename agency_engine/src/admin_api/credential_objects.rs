use std::{collections::HashMap, fmt::Display};

use agency_common::mask_key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{PaymentCredential, PaymentEnvironment, PaymentProvider};

/// The credential list is never paginated. At most this many records are fetched.
pub const MAX_CREDENTIALS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialQueryFilter {
    pub is_active: Option<bool>,
    pub provider: Option<PaymentProvider>,
    pub environment: Option<PaymentEnvironment>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    MAX_CREDENTIALS
}

impl Default for CredentialQueryFilter {
    fn default() -> Self {
        Self { is_active: None, provider: None, environment: None, limit: MAX_CREDENTIALS }
    }
}

impl CredentialQueryFilter {
    pub fn with_is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn with_provider(mut self, provider: PaymentProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_environment(mut self, environment: PaymentEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// True when no field filter is set. The limit does not count as a filter.
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.provider.is_none() && self.environment.is_none()
    }
}

impl Display for CredentialQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters. ")?;
        }
        if let Some(active) = self.is_active {
            write!(f, "is_active: {active}. ")?;
        }
        if let Some(provider) = &self.provider {
            write!(f, "provider: {provider}. ")?;
        }
        if let Some(environment) = &self.environment {
            write!(f, "environment: {environment}. ")?;
        }
        write!(f, "limit: {}", self.limit)
    }
}

//--------------------------------------     CredentialView    ---------------------------------------------------------
/// How a credential is shown to an admin.
///
/// The public key is always masked. The secret key is masked unless the admin has revealed it for this record in
/// the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialView {
    pub id: i64,
    pub provider: PaymentProvider,
    pub environment: PaymentEnvironment,
    pub is_active: bool,
    pub public_key: String,
    pub secret_key: String,
    pub secret_revealed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialView {
    pub fn new(credential: &PaymentCredential, reveal_secret: bool) -> Self {
        let secret_key = if reveal_secret {
            credential.secret_key.reveal().clone()
        } else {
            mask_key(credential.secret_key.reveal())
        };
        Self {
            id: credential.id,
            provider: credential.provider,
            environment: credential.environment,
            is_active: credential.is_active,
            public_key: mask_key(&credential.public_key),
            secret_key,
            secret_revealed: reveal_secret,
            created_at: credential.created_at,
            updated_at: credential.updated_at,
        }
    }

    pub fn masked(credential: &PaymentCredential) -> Self {
        Self::new(credential, false)
    }

    /// Renders a whole list, consulting `reveal` for each record.
    pub fn list(credentials: &[PaymentCredential], reveal: &RevealState) -> Vec<Self> {
        credentials.iter().map(|c| Self::new(c, reveal.is_revealed(c.id))).collect()
    }
}

//--------------------------------------      RevealState      ---------------------------------------------------------
/// Session-local record of which secret keys an admin has chosen to show in plain text.
///
/// This is view state only. It is never persisted, and never part of the credential itself. Every record starts out
/// masked.
#[derive(Debug, Clone, Default)]
pub struct RevealState {
    revealed: HashMap<i64, bool>,
}

impl RevealState {
    pub fn is_revealed(&self, id: i64) -> bool {
        self.revealed.get(&id).copied().unwrap_or(false)
    }

    /// Flips the reveal flag for `id` and returns the new value.
    pub fn toggle(&mut self, id: i64) -> bool {
        let flag = self.revealed.entry(id).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn forget(&mut self, id: i64) {
        self.revealed.remove(&id);
    }
}

//--------------------------------------    PendingDeletion    ---------------------------------------------------------
/// A deletion that has been requested but not yet confirmed.
///
/// Only [`CredentialApi::request_deletion`](crate::CredentialApi::request_deletion) can create one, and only
/// [`CredentialApi::confirm_deletion`](crate::CredentialApi::confirm_deletion) will act on it. There is no way to
/// delete a credential without passing through both steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    credential: PaymentCredential,
}

impl PendingDeletion {
    pub(crate) fn new(credential: PaymentCredential) -> Self {
        Self { credential }
    }

    pub fn id(&self) -> i64 {
        self.credential.id
    }

    /// The credential as it was when the deletion was requested.
    pub fn credential(&self) -> &PaymentCredential {
        &self.credential
    }
}

//--------------------------------------  CredentialsRefreshed  --------------------------------------------------------
/// The result of a credential mutation: the record that changed, followed by a fresh copy of the full list.
///
/// `credentials` is `None` when the mutation succeeded but the follow-up list refresh did not. Callers should keep
/// their current view in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialsRefreshed {
    pub changed: PaymentCredential,
    pub credentials: Option<Vec<PaymentCredential>>,
}
