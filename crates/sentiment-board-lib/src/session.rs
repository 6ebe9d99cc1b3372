//! Session registry: one `CommentStore` per browser session.
//!
//! A session starts the first time an unknown (or missing) id is seen and ends
//! when it stays idle for longer than the configured TTL; its store is dropped
//! with it. Stores are never shared between sessions. The per-session mutex
//! only serialises overlapping requests coming from the same browser.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::store::CommentStore;

/// Default idle lifetime of a session (30 minutes).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Opaque session identifier carried in the browser cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(SessionId)
    }
}

/// Shared handle on one session's store.
pub type SessionHandle = Arc<Mutex<CommentStore>>;

#[derive(Debug)]
struct SessionEntry {
    store: SessionHandle,
    last_seen: Instant,
}

/// Result of looking a session up.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: SessionId,
    pub store: SessionHandle,
    /// True when a fresh session (and empty store) was created.
    pub created: bool,
}

/// All live sessions of the process.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionEntry>,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Return the store for `id`, creating a new session when `id` is absent,
    /// unknown or already expired.
    pub fn resolve(&self, id: Option<SessionId>) -> ResolvedSession {
        self.resolve_at(id, Instant::now())
    }

    /// `resolve` with an explicit clock, for tests and the sweeper.
    pub fn resolve_at(&self, id: Option<SessionId>, now: Instant) -> ResolvedSession {
        if let Some(id) = id {
            let mut expired = false;
            if let Some(mut entry) = self.sessions.get_mut(&id) {
                if now.saturating_duration_since(entry.last_seen) <= self.idle_ttl {
                    entry.last_seen = now;
                    return ResolvedSession {
                        id,
                        store: Arc::clone(&entry.store),
                        created: false,
                    };
                }
                expired = true;
            }
            // The shard guard is released before removing.
            if expired {
                self.sessions.remove(&id);
                tracing::debug!(session = %id, "session expired on access");
            }
        }

        let id = SessionId::generate();
        let store: SessionHandle = Arc::new(Mutex::new(CommentStore::new()));
        self.sessions.insert(
            id,
            SessionEntry {
                store: Arc::clone(&store),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, "session created");
        ResolvedSession {
            id,
            store,
            created: true,
        }
    }

    /// Drop every session idle for longer than the TTL; returns how many went.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.idle_ttl;
        self.sessions
            .retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{comment_record::CommentRecord, sentiment::SentimentLabel};

    #[test]
    fn test_missing_id_creates_session() {
        let reg = SessionRegistry::default();
        let s = reg.resolve(None);
        assert!(s.created);
        assert!(s.store.lock().is_empty());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_known_id_returns_same_store() {
        let reg = SessionRegistry::default();
        let first = reg.resolve(None);
        first
            .store
            .lock()
            .push(CommentRecord::new("a", "x", SentimentLabel::Positive));

        let again = reg.resolve(Some(first.id));
        assert!(!again.created);
        assert_eq!(again.id, first.id);
        assert_eq!(again.store.lock().len(), 1);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let reg = SessionRegistry::default();
        let a = reg.resolve(None);
        let b = reg.resolve(None);
        assert_ne!(a.id, b.id);
        a.store
            .lock()
            .push(CommentRecord::new("a", "x", SentimentLabel::Positive));
        assert!(b.store.lock().is_empty());
    }

    #[test]
    fn test_unknown_id_gets_fresh_session() {
        let reg = SessionRegistry::default();
        let stranger = SessionId::generate();
        let s = reg.resolve(Some(stranger));
        assert!(s.created);
        assert_ne!(s.id, stranger);
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let ttl = Duration::from_secs(60);
        let reg = SessionRegistry::new(ttl);
        let t0 = Instant::now();
        let old = reg.resolve_at(None, t0);
        let fresh = reg.resolve_at(None, t0 + Duration::from_secs(50));

        let removed = reg.evict_idle(t0 + Duration::from_secs(90));
        assert_eq!(removed, 1);
        assert_eq!(reg.len(), 1);

        let back = reg.resolve_at(Some(fresh.id), t0 + Duration::from_secs(91));
        assert!(!back.created);
        let gone = reg.resolve_at(Some(old.id), t0 + Duration::from_secs(91));
        assert!(gone.created);
    }

    #[test]
    fn test_expired_id_is_replaced_on_access() {
        let ttl = Duration::from_secs(10);
        let reg = SessionRegistry::new(ttl);
        let t0 = Instant::now();
        let s = reg.resolve_at(None, t0);
        let later = reg.resolve_at(Some(s.id), t0 + Duration::from_secs(11));
        assert!(later.created);
        assert_ne!(later.id, s.id);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_session_id_round_trips_through_cookie_text() {
        let id = SessionId::generate();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }
}
