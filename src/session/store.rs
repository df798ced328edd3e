//! In-memory session store with expiry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::batch::BatchParams;

const TOKEN_RANDOM_CHARS: usize = 11;

struct SessionEntry {
    created: Instant,
    params: BatchParams,
}

/// Keyed store of prepared batch parameters.
///
/// Tokens stay redeemable until they expire, so a client can reconnect to the
/// same session. Expired entries are purged whenever the store is touched.
pub struct SessionStore {
    ttl: Duration,
    entries: Mutex<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Stores `params` and returns the token that redeems them.
    ///
    /// The token is also recorded as the params' session id.
    pub fn prepare(&self, mut params: BatchParams) -> String {
        let token = new_session_token();
        params.session_id = Some(token.clone());

        let mut entries = self.lock();
        purge_expired(&mut entries, self.ttl);
        entries.insert(
            token.clone(),
            SessionEntry {
                created: Instant::now(),
                params,
            },
        );
        log::debug!("Prepared session {} ({} live)", token, entries.len());
        token
    }

    /// Returns the params stored under `token` unless missing or expired.
    pub fn get(&self, token: &str) -> Option<BatchParams> {
        let mut entries = self.lock();
        purge_expired(&mut entries, self.ttl);
        entries.get(token).map(|entry| entry.params.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        // Entries stay consistent even if a holder panicked mid-insert
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn purge_expired(entries: &mut HashMap<String, SessionEntry>, ttl: Duration) {
    entries.retain(|_, entry| entry.created.elapsed() < ttl);
}

/// `session_<11 alphanumerics>_<unix seconds>`
pub(crate) fn new_session_token() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_RANDOM_CHARS)
        .map(char::from)
        .collect();
    format!("session_{}_{}", random, Utc::now().timestamp())
}
