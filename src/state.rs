use std::sync::Arc;

use crate::auth::{SessionStore, UserDirectory};
use crate::config::AppConfig;
use crate::database::Database;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: SessionStore,
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn new(db: Database, sessions: SessionStore, users: UserDirectory) -> Self {
        Self {
            db,
            sessions,
            users: Arc::new(users),
        }
    }

    /// Builds state from configuration with an empty session store.
    pub fn from_config(config: &AppConfig) -> Result<Self, sqlx::Error> {
        let db = Database::from_config(&config.database)?;
        let users = UserDirectory::new(config.auth.users.clone());
        Ok(Self::new(db, SessionStore::new(), users))
    }
}
