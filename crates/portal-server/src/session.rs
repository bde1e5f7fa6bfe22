use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    user_id: i64,
    expires_at: DateTime<Utc>,
}

/// Server-side session store keyed by opaque tokens. A token says nothing by
/// itself; everything it stands for lives in this map. Expiry is rolling:
/// every successful resolve pushes the deadline forward by the TTL. Sessions
/// vanish on restart together with the user store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh session bound to `user_id`. Expired entries are purged
    /// on the way in, so the map cannot grow without bound even though there
    /// is no background sweeper.
    pub async fn create(&self, user_id: i64) -> Uuid {
        let token = Uuid::new_v4();
        let now = Utc::now();

        let mut sessions = self.inner.write().await;
        sessions.retain(|_, session| session.expires_at > now);
        sessions.insert(
            token,
            Session {
                user_id,
                expires_at: now + self.ttl,
            },
        );

        tracing::debug!("Created session for user {}", user_id);

        token
    }

    /// Resolve a token to its user id, extending the session lifetime.
    /// Unknown and expired tokens both come back as `None`; an expired entry
    /// is dropped on the spot.
    pub async fn resolve(&self, token: Uuid) -> Option<i64> {
        let now = Utc::now();

        let mut sessions = self.inner.write().await;
        let mut session = sessions.remove(&token)?;
        if session.expires_at <= now {
            return None;
        }

        session.expires_at = now + self.ttl;
        let user_id = session.user_id;
        sessions.insert(token, session);

        Some(user_id)
    }

    /// Drop a session. Unknown tokens are ignored.
    pub async fn destroy(&self, token: Uuid) {
        if self.inner.write().await.remove(&token).is_some() {
            tracing::debug!("Destroyed session");
        }
    }

    /// Drop every expired session, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();

        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }
}
