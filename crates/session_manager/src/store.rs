//! Process-wide session store keyed by user id

use std::sync::Arc;
use std::time::Duration;

use chat_core::config::DEFAULT_STACK_LIMIT;
use chat_core::UserId;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;

use crate::session::UserSession;

/// Holds one session per user. Locking a session serializes event handling
/// for that user; different users never contend.
///
/// Sessions live in memory only. Without [`SessionStore::evict_idle`] or
/// [`SessionStore::spawn_sweeper`] the map grows with every new user.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<UserId, Arc<Mutex<UserSession>>>,
    stack_limit: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_LIMIT)
    }
}

impl SessionStore {
    pub fn new(stack_limit: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            stack_limit,
        }
    }

    pub fn stack_limit(&self) -> usize {
        self.stack_limit
    }

    /// Get or create the session handle for a user
    pub fn session(&self, user_id: UserId) -> Arc<Mutex<UserSession>> {
        // The map guard is released before the caller awaits the session lock.
        self.sessions
            .entry(user_id)
            .or_insert_with(|| {
                tracing::debug!(%user_id, "creating session");
                Arc::new(Mutex::new(UserSession::new(user_id, self.stack_limit)))
            })
            .clone()
    }

    /// Exclusive access to a user's session for the duration of one event
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<UserSession> {
        self.session(user_id).lock_owned().await
    }

    /// Copy of the session, if the user has one
    pub async fn snapshot(&self, user_id: UserId) -> Option<UserSession> {
        let handle = self.sessions.get(&user_id).map(|entry| entry.value().clone())?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Forget a user's session
    pub fn remove(&self, user_id: UserId) -> bool {
        self.sessions.remove(&user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions last updated at least `max_idle` ago. A session that is
    /// locked or whose handle is held elsewhere stays. Returns the number dropped.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let users: Vec<UserId> = self.sessions.iter().map(|entry| *entry.key()).collect();

        let mut evicted = 0;
        for user_id in users {
            let removed = self.sessions.remove_if(&user_id, |_, handle| {
                Arc::strong_count(handle) == 1
                    && handle
                        .try_lock()
                        .map(|session| is_idle(&session.last_updated, max_idle))
                        .unwrap_or(false)
            });
            if removed.is_some() {
                tracing::debug!(%user_id, "evicting idle session");
                evicted += 1;
            }
        }
        evicted
    }

    /// Evict idle sessions every `every` until the returned task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>, max_idle: Duration, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = self.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::info!(evicted, remaining = self.len(), "idle sessions evicted");
                }
            }
        })
    }
}

fn is_idle(last_updated: &chrono::DateTime<Utc>, max_idle: Duration) -> bool {
    (Utc::now() - *last_updated)
        .to_std()
        .map(|age| age >= max_idle)
        .unwrap_or(false)
}
