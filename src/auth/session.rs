use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::SessionUser;

/// Process-lifetime token store.
///
/// Cloning is cheap and every clone shares the same map, so one instance is
/// created at startup and handed to the router state. Sessions never expire;
/// they end on logout or when the process exits.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionUser>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh 128-bit token (32 hex chars) for `user`.
    pub async fn create(&self, user: SessionUser) -> String {
        let mut sessions = self.sessions.write().await;
        let token = loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        debug!(email = %user.email, role = %user.role, "Session created");
        sessions.insert(token.clone(), user);
        token
    }

    pub async fn lookup(&self, token: &str) -> Option<SessionUser> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Removes `token` if present. Revoking an unknown token is a no-op.
    pub async fn revoke(&self, token: &str) {
        if let Some(user) = self.sessions.write().await.remove(token) {
            debug!(email = %user.email, "Session revoked");
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
