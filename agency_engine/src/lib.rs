//! Agency Engine
//!
//! The core logic behind the agency admin panel. The engine is storage-agnostic.
//!
//! The library is divided into two main sections:
//! 1. Entity store backends ([`mod@traits`]). One trait per collection: payment credentials, contact submissions and
//!    transactions. [`SqliteDatabase`] implements all of them. The record types live in [`db_types`].
//! 2. The admin API ([`mod@admin_api`]). [`CredentialApi`] manages payment-provider credentials, [`DashboardApi`]
//!    computes the dashboard counters and [`ContactApi`] handles the public contact form. Each API is handed its
//!    backend on construction.
pub mod admin_api;
pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use admin_api::{
    contact_api::ContactApi,
    contact_objects,
    credential_api::CredentialApi,
    credential_objects,
    dashboard_api::DashboardApi,
    dashboard_objects,
    errors::{ContactApiError, CredentialApiError},
};
#[cfg(feature = "sqlite")]
pub use sqlite::{
    db::{db_url, DEFAULT_DATABASE_URL},
    SqliteDatabase,
};
