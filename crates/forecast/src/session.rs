//! Per-device UV pagination sessions.
//!
//! Each device gets one session holding an offset cursor into its most
//! recent UV forecast, so repeated requests reveal successive record
//! windows. Sessions idle longer than the TTL are pruned lazily on the
//! next lookup — session expiry and response-cache expiry share the same
//! duration but tick independently.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Pagination state for one device. Unique per owner.
#[derive(Debug, Clone)]
pub struct UvSession {
    pub owner: String,
    pub last_access: DateTime<Utc>,
    /// Start index of the next record window; 0 is the reset state.
    pub cursor: usize,
}

/// All live UV sessions.
#[derive(Debug)]
pub struct SessionTracker {
    sessions: Vec<UvSession>,
    idle_ttl: Duration,
}

impl SessionTracker {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: Vec::new(),
            idle_ttl: Duration::hours(ttl_hours),
        }
    }

    /// Prune idle sessions, then return the device's session — creating a
    /// fresh cursor-0 session if none survives.
    pub fn get_or_create(&mut self, owner: &str) -> &UvSession {
        self.get_or_create_at(owner, Utc::now())
    }

    pub fn get_or_create_at(&mut self, owner: &str, now: DateTime<Utc>) -> &UvSession {
        self.prune(now);

        let idx = match self.sessions.iter().position(|s| s.owner == owner) {
            Some(i) => i,
            None => {
                debug!("Creating UV session for {}", owner);
                self.sessions.push(UvSession {
                    owner: owner.to_string(),
                    last_access: now,
                    cursor: 0,
                });
                self.sessions.len() - 1
            }
        };
        &self.sessions[idx]
    }

    /// Upsert the device's cursor and refresh its idle timer.
    pub fn advance(&mut self, owner: &str, new_cursor: usize) {
        self.advance_at(owner, new_cursor, Utc::now());
    }

    pub fn advance_at(&mut self, owner: &str, new_cursor: usize, now: DateTime<Utc>) {
        match self.sessions.iter_mut().find(|s| s.owner == owner) {
            Some(session) => {
                session.cursor = new_cursor;
                session.last_access = now;
            }
            None => self.sessions.push(UvSession {
                owner: owner.to_string(),
                last_access: now,
                cursor: new_cursor,
            }),
        }
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        let idle_ttl = self.idle_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|s| now - s.last_access < idle_ttl);
        if self.sessions.len() < before {
            debug!(
                "Pruned {} idle UV sessions",
                before - self.sessions.len()
            );
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
