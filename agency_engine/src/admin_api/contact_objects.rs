use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::ContactStatus;

pub const DEFAULT_CONTACT_LIMIT: u32 = 100;
pub const MAX_CONTACT_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactQueryFilter {
    pub status: Option<ContactStatus>,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_CONTACT_LIMIT
}

impl Default for ContactQueryFilter {
    fn default() -> Self {
        Self { status: None, limit: DEFAULT_CONTACT_LIMIT }
    }
}

impl ContactQueryFilter {
    /// Only submissions that nobody has followed up on yet.
    pub fn pending() -> Self {
        Self::default().with_status(ContactStatus::Pending)
    }

    pub fn with_status(mut self, status: ContactStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the limit, clamped to `1..=MAX_CONTACT_LIMIT`.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_CONTACT_LIMIT);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
    }
}

impl Display for ContactQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Some(status) => write!(f, "status: {status}. limit: {}", self.limit),
            None => write!(f, "No filters. limit: {}", self.limit),
        }
    }
}
