//! # Admin panel public API
//!
//! The `admin_api` module exposes the programmatic API behind the admin panel. As with the backends, the API is
//! modular so that clients can pick the parts they need:
//!
//! * [`credential_api`] manages payment-provider credentials: listing, creating, editing, toggling, and the two-step
//!   deletion flow.
//! * [`dashboard_api`] reduces the transactions, contact submissions and credentials into a [`DashboardSnapshot`].
//! * [`contact_api`] accepts contact form submissions from the public site and lists them for admins.
//!
//! # API usage
//!
//! Every API is created by handing it a backend that implements the traits it needs. The backend is never created
//! internally, so tests can pass in a fake store.
//!
//! ```rust,ignore
//! use agency_engine::{CredentialApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/agency_store.db", 5).await?;
//! let api = CredentialApi::new(db);
//! let credentials = api.list().await?;
//! ```
//!
//! [`DashboardSnapshot`]: dashboard_objects::DashboardSnapshot

pub mod contact_api;
pub mod contact_objects;
pub mod credential_api;
pub mod credential_objects;
pub mod dashboard_api;
pub mod dashboard_objects;
pub mod errors;
