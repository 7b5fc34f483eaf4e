use std::fmt::Debug;

use futures_util::try_join;
use log::*;

use crate::{
    admin_api::{
        contact_objects::ContactQueryFilter,
        credential_objects::CredentialQueryFilter,
        dashboard_objects::{
            DashboardSnapshot,
            ACTIVE_CREDENTIAL_WINDOW,
            PENDING_CONTACT_WINDOW,
            TRANSACTION_WINDOW,
        },
    },
    traits::{ContactManagement, CredentialManagement, StoreError, TransactionManagement},
};

/// Reduces the transaction, contact and credential collections into a [`DashboardSnapshot`].
pub struct DashboardApi<B> {
    db: B,
}

impl<B: Debug> Debug for DashboardApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DashboardApi ({:?})", self.db)
    }
}

impl<B> DashboardApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> DashboardApi<B>
where B: TransactionManagement + ContactManagement + CredentialManagement
{
    /// Computes the dashboard counters.
    ///
    /// If any of the underlying reads fails, the error is logged and an all-zero snapshot is returned. Partial
    /// snapshots are never produced.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        match self.try_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("📊️ Could not load dashboard data. Showing empty counters. {e}");
                DashboardSnapshot::default()
            },
        }
    }

    /// As [`Self::snapshot`], but reports the store error instead of falling back to zeroes.
    pub async fn try_snapshot(&self) -> Result<DashboardSnapshot, StoreError> {
        let pending = ContactQueryFilter::pending().with_limit(PENDING_CONTACT_WINDOW);
        let active = CredentialQueryFilter::default().with_is_active(true).with_limit(ACTIVE_CREDENTIAL_WINDOW);
        let (transactions, contacts, credentials) = try_join!(
            self.db.fetch_transactions(TRANSACTION_WINDOW),
            self.db.fetch_contacts(pending),
            self.db.fetch_credentials(active),
        )?;
        let snapshot = DashboardSnapshot::from_parts(&transactions, &contacts, &credentials);
        debug!("📊️ Dashboard snapshot: {snapshot:?}");
        Ok(snapshot)
    }
}
