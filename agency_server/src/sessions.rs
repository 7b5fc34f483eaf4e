//! Per-session view state for the admin panel.
//!
//! None of this is persisted. A restart forgets every reveal flag, open deletion and revoked session, which is
//! harmless: revoked session tokens are short-lived and reveal flags default to masked.
use agency_engine::credential_objects::{PendingDeletion, RevealState};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use log::*;

use crate::auth::random_nonce;

const DELETION_TTL_MINUTES: i64 = 5;

/// An opened, unconfirmed deletion, bound to the session that opened it.
#[derive(Debug, Clone)]
pub struct DeletionTicket {
    pub sid: String,
    pub pending: PendingDeletion,
    pub expires_at: DateTime<Utc>,
}

/// One session's reveal flags. They are dropped once the session token has expired.
#[derive(Debug, Clone, Default)]
struct SessionReveals {
    state: RevealState,
    expires_at: i64,
}

#[derive(Debug)]
pub struct SessionStore {
    reveals: DashMap<String, SessionReveals>,
    deletions: DashMap<String, DeletionTicket>,
    /// Session ids that have logged out, mapped to the expiry of their token.
    revoked: DashMap<String, i64>,
    deletion_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DELETION_TTL_MINUTES))
    }
}

impl SessionStore {
    pub fn new(deletion_ttl: Duration) -> Self {
        Self { reveals: DashMap::new(), deletions: DashMap::new(), revoked: DashMap::new(), deletion_ttl }
    }

    //----------------------------------------------   Reveal   --------------------------------------------------------
    pub fn reveal_state(&self, sid: &str) -> RevealState {
        self.reveals.get(sid).map(|r| r.state.clone()).unwrap_or_default()
    }

    /// Flips the reveal flag of credential `id` for this session only, returning the new value. `expires_at` is the
    /// expiry of the session token, after which the flags are forgotten.
    pub fn toggle_reveal(&self, sid: &str, id: i64, expires_at: i64) -> bool {
        self.purge_expired();
        let mut reveals = self.reveals.entry(sid.to_string()).or_default();
        reveals.expires_at = reveals.expires_at.max(expires_at);
        reveals.state.toggle(id)
    }

    /// Drops every session's reveal flag for a credential that no longer exists.
    pub fn forget_credential(&self, id: i64) {
        self.reveals.iter_mut().for_each(|mut r| r.state.forget(id));
    }

    //----------------------------------------------  Deletion  --------------------------------------------------------
    /// Parks a pending deletion and returns the ticket that confirms it.
    pub fn open_deletion(&self, sid: &str, pending: PendingDeletion) -> (String, DateTime<Utc>) {
        self.purge_expired();
        let ticket = random_nonce();
        let expires_at = Utc::now() + self.deletion_ttl;
        debug!("🗑️ Deletion of payment setting #{} opened. Ticket expires at {expires_at}", pending.id());
        self.deletions.insert(ticket.clone(), DeletionTicket { sid: sid.to_string(), pending, expires_at });
        (ticket, expires_at)
    }

    /// Redeems a ticket. It must have been opened by the same session, for the same credential, and not have expired.
    /// A ticket can be redeemed at most once, whether or not the checks pass.
    pub fn take_deletion(&self, sid: &str, ticket: &str, id: i64) -> Option<PendingDeletion> {
        let (_, ticket) = self.deletions.remove(ticket)?;
        if ticket.sid != sid || ticket.pending.id() != id {
            warn!("🗑️ A deletion ticket for #{} was presented with the wrong session or credential", ticket.pending.id());
            return None;
        }
        if ticket.expires_at <= Utc::now() {
            debug!("🗑️ Deletion ticket for #{} has expired", ticket.pending.id());
            return None;
        }
        Some(ticket.pending)
    }

    //----------------------------------------------  Sessions  --------------------------------------------------------
    /// Forgets everything held for the session and refuses its token from now on. `exp` is the token's expiry, after
    /// which there is no need to remember the revocation.
    pub fn end_session(&self, sid: &str, exp: i64) {
        self.reveals.remove(sid);
        self.deletions.retain(|_, t| t.sid != sid);
        self.revoked.insert(sid.to_string(), exp);
        self.purge_expired();
        info!("🔐️ Session ended");
    }

    pub fn is_revoked(&self, sid: &str) -> bool {
        self.revoked.contains_key(sid)
    }

    fn purge_expired(&self) {
        let now = Utc::now();
        self.deletions.retain(|_, t| t.expires_at > now);
        self.reveals.retain(|_, r| r.expires_at > now.timestamp());
        self.revoked.retain(|_, exp| *exp > now.timestamp());
    }
}
