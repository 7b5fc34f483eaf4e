use serde::{Deserialize, Serialize};

use crate::db_types::{ContactSubmission, PaymentCredential, Transaction};

/// Upper bound on transactions read for a snapshot.
pub const TRANSACTION_WINDOW: u32 = 1000;
/// Upper bound on pending contact submissions read for a snapshot.
pub const PENDING_CONTACT_WINDOW: u32 = 1000;
/// Upper bound on active credentials read for a snapshot.
pub const ACTIVE_CREDENTIAL_WINDOW: u32 = 100;

/// Summary counters for the admin dashboard. Derived on every load and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub total_transactions: u64,
    pub total_revenue: f64,
    pub pending_messages: u64,
    pub active_payment_settings: u64,
}

impl DashboardSnapshot {
    pub fn from_parts(
        transactions: &[Transaction],
        pending_contacts: &[ContactSubmission],
        active_credentials: &[PaymentCredential],
    ) -> Self {
        Self {
            total_transactions: transactions.len() as u64,
            total_revenue: total_revenue(transactions),
            pending_messages: pending_contacts.len() as u64,
            active_payment_settings: active_credentials.len() as u64,
        }
    }
}

/// Sum of `amount` over successful transactions. A missing amount counts as zero.
pub fn total_revenue(transactions: &[Transaction]) -> f64 {
    transactions.iter().filter(|t| t.is_successful()).map(|t| t.amount.unwrap_or(0.0)).sum()
}
