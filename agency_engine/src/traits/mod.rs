//! # Entity store backends
//!
//! This module defines the interface contracts that an entity store *backend* must honour to serve the admin panel.
//! Each trait covers one entity collection:
//!
//! * [`CredentialManagement`] manages the `payment_settings` collection of payment-provider API keys.
//! * [`ContactManagement`] appends to and queries the `contact_submissions` collection.
//! * [`TransactionManagement`] reads the `transactions` collection. Transactions are never written from here.
//!
//! The bundled [`SqliteDatabase`](crate::SqliteDatabase) implements all three. Tests substitute fakes.
//!
//! All backends report failures as [`StoreError`]. The public APIs in [`crate::admin_api`] translate these into
//! short, user-facing errors and log the detail.
mod contact_management;
mod credential_management;
mod store_error;
mod transaction_management;

pub use contact_management::ContactManagement;
pub use credential_management::CredentialManagement;
pub use store_error::StoreError;
pub use transaction_management::TransactionManagement;
