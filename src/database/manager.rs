use sqlx::error::ErrorKind;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;
use crate::error::ApiError;

/// Errors from statements run against the database, classified once so
/// handlers only pick the message.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("constraint violated: {0}")]
    ConstraintViolation(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl DatabaseError {
    pub fn is_integrity_violation(&self) -> bool {
        !matches!(self, DatabaseError::Sqlx(_))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return DatabaseError::UniqueViolation(constraint),
                ErrorKind::ForeignKeyViolation => return DatabaseError::ForeignKeyViolation(constraint),
                ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                    return DatabaseError::ConstraintViolation(db_err.message().to_string())
                }
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Opens one connection per request. There is no pool: each handler gets a
/// fresh connection and gives it back by dropping the guard.
#[derive(Clone)]
pub struct Database {
    options: PgConnectOptions,
    connect_timeout: Duration,
    description: String,
}

impl Database {
    pub fn new(options: PgConnectOptions, connect_timeout: Duration) -> Self {
        let description = format!(
            "{}:{}/{}",
            options.get_host(),
            options.get_port(),
            options.get_database().unwrap_or_default()
        );
        Self {
            options,
            connect_timeout,
            description,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let mut options = match &config.url {
            Some(url) => PgConnectOptions::from_str(url)?,
            None => PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.user)
                .password(&config.password)
                .database(&config.name),
        };
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let mut database = Self::new(options, config.connect_timeout());
        if let Some(url) = &config.url {
            database.description = redact_url(url);
        }
        Ok(database)
    }

    /// Connection target with any password removed, safe for logs.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Opens a connection, or `None` when the database cannot be reached
    /// within the connect timeout. Never panics or errors.
    pub async fn connect(&self) -> Option<DbConnection> {
        match tokio::time::timeout(self.connect_timeout, PgConnection::connect_with(&self.options)).await {
            Ok(Ok(conn)) => {
                debug!(target_db = %self.description, "Database connection opened");
                Some(DbConnection { conn: Some(conn) })
            }
            Ok(Err(e)) => {
                warn!(target_db = %self.description, error = %e, "Error connecting to database");
                None
            }
            Err(_) => {
                warn!(
                    target_db = %self.description,
                    timeout_ms = self.connect_timeout.as_millis() as u64,
                    "Timed out connecting to database"
                );
                None
            }
        }
    }

    /// Like [`Database::connect`], with absence mapped to the standard 500.
    pub async fn acquire(&self) -> Result<DbConnection, ApiError> {
        self.connect().await.ok_or(ApiError::ServiceUnavailable)
    }

    /// True when a connection can be opened right now.
    pub async fn health_check(&self) -> bool {
        self.connect().await.is_some()
    }
}

/// Scoped database connection. Dropping the guard closes the connection,
/// whichever path the handler leaves by.
pub struct DbConnection {
    conn: Option<PgConnection>,
}

impl Deref for DbConnection {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        self.conn.as_ref().expect("connection is only taken on drop")
    }
}

impl DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut PgConnection {
        self.conn.as_mut().expect("connection is only taken on drop")
    }
}

impl Drop for DbConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        // Graceful close needs the runtime; outside one the socket is simply dropped.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = conn.close().await {
                    debug!(error = %e, "Error closing database connection");
                }
            });
        }
    }
}

fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => "<invalid database url>".to_string(),
    }
}
