//! In-memory session store keyed by browser cookie tokens.
//!
//! Each browser session maps an opaque token (carried in a cookie) to its
//! [`SessionData`]: the todo lists plus pending flash messages. Sessions
//! expire after an idle TTL and the store enforces a capacity cap.
//!
//! # Token Format
//!
//! Session tokens are 32 bytes of cryptographically secure random data,
//! base64-url encoded without padding, resulting in 43 character tokens.
//!
//! # Concurrency
//!
//! The store uses interior mutability with [`RwLock`]. Handlers load a
//! cloned snapshot, mutate it, and store the whole snapshot back; if two
//! requests race on one session the last write wins, which is acceptable
//! for this single-browser workload.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::types::SessionData;

/// Default idle TTL for sessions (24 hours).
const DEFAULT_TTL_SECS: u64 = 86_400;

/// Default maximum number of concurrent sessions.
const DEFAULT_MAX_CAPACITY: usize = 10_000;

/// Size of the random token in bytes.
const TOKEN_BYTES: usize = 32;

/// Expected length of a base64-url encoded token (43 characters).
const TOKEN_LENGTH: usize = 43;

/// Errors that can occur during session operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The session store has reached maximum capacity.
    #[error("session store at maximum capacity ({max_capacity} sessions)")]
    AtCapacity {
        /// The maximum number of sessions allowed.
        max_capacity: usize,
    },
}

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Maximum number of concurrent sessions.
    pub max_capacity: usize,

    /// Idle time-to-live; refreshed every time a session is stored.
    pub ttl: Duration,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

impl SessionStoreConfig {
    /// Creates a new configuration with custom values.
    pub fn new(max_capacity: usize, ttl: Duration) -> Self {
        Self { max_capacity, ttl }
    }
}

/// One session's data plus its expiry deadline.
#[derive(Debug, Clone)]
struct SessionEntry {
    data: SessionData,
    expires_at: Instant,
}

impl SessionEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Thread-safe in-memory session store.
///
/// Cloning the store is cheap and shares the underlying map, so it can be
/// embedded directly in the axum application state.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    config: SessionStoreConfig,
}

impl SessionStore {
    /// Creates a new session store with the given configuration.
    pub fn new(config: SessionStoreConfig) -> Self {
        debug!(
            max_capacity = config.max_capacity,
            ttl_secs = config.ttl.as_secs(),
            "Creating new session store"
        );
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Creates a fresh, empty session and returns its token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AtCapacity`] if the store has reached its
    /// maximum capacity.
    pub fn create(&self) -> Result<String, SessionError> {
        // Generate the token outside the lock.
        let token = generate_session_token();

        let mut sessions = self.sessions.write().unwrap();

        if sessions.len() >= self.config.max_capacity {
            warn!(
                capacity = sessions.len(),
                max_capacity = self.config.max_capacity,
                "Session store at capacity, rejecting new session"
            );
            return Err(SessionError::AtCapacity {
                max_capacity: self.config.max_capacity,
            });
        }

        let entry = SessionEntry {
            data: SessionData::default(),
            expires_at: Instant::now() + self.config.ttl,
        };
        sessions.insert(token.clone(), entry);
        trace!("Created new session");

        Ok(token)
    }

    /// Loads a snapshot of the session for `token`, if it exists and has
    /// not expired.
    ///
    /// Performs lazy cleanup of the accessed session if expired.
    pub fn load(&self, token: &str) -> Option<SessionData> {
        // Quick format check before touching the map.
        if token.len() != TOKEN_LENGTH {
            trace!(token_len = token.len(), "Invalid session token length");
            return None;
        }

        {
            let sessions = self.sessions.read().unwrap();
            match sessions.get(token) {
                Some(entry) if !entry.is_expired() => return Some(entry.data.clone()),
                Some(_) => {}
                None => {
                    trace!("Session token not found");
                    return None;
                }
            }
        }

        // Entry exists but is expired; drop it.
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(token);
        trace!("Removed expired session during load");
        None
    }

    /// Stores a snapshot back for `token`, refreshing the idle TTL.
    ///
    /// Storing against an unknown token re-creates the entry; this keeps
    /// last-write-wins semantics simple when a session expires mid-request.
    pub fn store(&self, token: &str, data: SessionData) {
        let mut sessions = self.sessions.write().unwrap();
        let entry = SessionEntry {
            data,
            expires_at: Instant::now() + self.config.ttl,
        };
        sessions.insert(token.to_string(), entry);
    }

    /// Removes a session, returning its data if it existed.
    pub fn remove(&self, token: &str) -> Option<SessionData> {
        let mut sessions = self.sessions.write().unwrap();
        sessions.remove(token).map(|entry| entry.data)
    }

    /// Returns the current number of sessions in the store.
    ///
    /// Note: the count may include expired sessions that have not been
    /// swept yet.
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }

    /// Returns the maximum capacity of the store.
    pub fn max_capacity(&self) -> usize {
        self.config.max_capacity
    }

    /// Removes all expired sessions from the store.
    ///
    /// Complements the lazy cleanup on access; called from the background
    /// sweep task.
    ///
    /// # Returns
    ///
    /// The number of sessions that were removed.
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap();
        let initial_len = sessions.len();

        sessions.retain(|_, entry| !entry.is_expired());

        let removed = initial_len - sessions.len();
        if removed > 0 {
            debug!(
                removed_count = removed,
                remaining_count = sessions.len(),
                "Cleaned up expired sessions"
            );
        }
        removed
    }

    /// Spawns a background task that periodically sweeps expired sessions.
    ///
    /// # Returns
    ///
    /// A join handle that can be used to abort the task on shutdown.
    pub fn spawn_cleanup_task(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);

            loop {
                interval.tick().await;
                store.cleanup_expired();
            }
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionStoreConfig::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.sessions.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("SessionStore")
            .field("session_count", &len)
            .field("config", &self.config)
            .finish()
    }
}

/// Generates a cryptographically secure session token.
///
/// The token is 32 bytes of random data, base64-url encoded without
/// padding, resulting in a 43-character string.
fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
