use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When set it wins over the individual parts below.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub connect_timeout_ms: u64,
    pub bootstrap_on_start: bool,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub users: Vec<UserCredential>,
}

/// Static login record. Only consulted by the login handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredential {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: String,
}

impl DatabaseConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl AuthConfig {
    /// The three demo accounts shipped with the application.
    pub fn demo_users() -> Self {
        Self {
            users: vec![
                UserCredential {
                    email: "admin@college.edu".to_string(),
                    password: "admin123".to_string(),
                    role: Role::Admin,
                    name: "Admin User".to_string(),
                },
                UserCredential {
                    email: "faculty@college.edu".to_string(),
                    password: "faculty123".to_string(),
                    role: Role::Faculty,
                    name: "Faculty User".to_string(),
                },
                UserCredential {
                    email: "student@college.edu".to_string(),
                    password: "student123".to_string(),
                    role: Role::Student,
                    name: "Student User".to_string(),
                },
            ],
        }
    }

    fn set_password(&mut self, role: Role, password: String) {
        for user in self.users.iter_mut().filter(|u| u.role == role) {
            user.password = password.clone();
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("COLLEGE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_MS") {
            self.database.connect_timeout_ms = v.parse().unwrap_or(self.database.connect_timeout_ms);
        }
        if let Ok(v) = env::var("DATABASE_BOOTSTRAP_ON_START") {
            self.database.bootstrap_on_start = v.parse().unwrap_or(self.database.bootstrap_on_start);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Demo account passwords
        if let Ok(v) = env::var("AUTH_ADMIN_PASSWORD") {
            self.auth.set_password(Role::Admin, v);
        }
        if let Ok(v) = env::var("AUTH_FACULTY_PASSWORD") {
            self.auth.set_password(Role::Faculty, v);
        }
        if let Ok(v) = env::var("AUTH_STUDENT_PASSWORD") {
            self.auth.set_password(Role::Student, v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                user: "postgres".to_string(),
                password: String::new(),
                name: "smart_exam_cell".to_string(),
                connect_timeout_ms: 5_000,
                bootstrap_on_start: true,
                enable_query_logging: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
            auth: AuthConfig::demo_users(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.connect_timeout_ms = 3_000;
        config.database.enable_query_logging = false;
        config.security.cors_origins = vec!["https://staging.college.example".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.connect_timeout_ms = 2_000;
        config.database.enable_query_logging = false;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 1024 * 1024; // 1MB
        config.security.cors_origins = vec!["https://college.example".to_string()];
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert!(config.database.bootstrap_on_start);
        assert!(config.security.cors_origins.is_empty());
        assert_eq!(config.auth.users.len(), 3);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(matches!(config.environment, Environment::Production));
        assert!(!config.database.enable_query_logging);
        assert!(!config.security.cors_origins.is_empty());
        assert!(config.api.max_request_size_bytes < AppConfig::development().api.max_request_size_bytes);
    }

    #[test]
    fn demo_users_cover_every_role() {
        let auth = AuthConfig::demo_users();
        for role in [Role::Admin, Role::Faculty, Role::Student] {
            assert_eq!(auth.users.iter().filter(|u| u.role == role).count(), 1);
        }
    }

    #[test]
    fn password_override_targets_one_role() {
        let mut auth = AuthConfig::demo_users();
        auth.set_password(Role::Faculty, "changed".to_string());

        let faculty = auth.users.iter().find(|u| u.role == Role::Faculty).unwrap();
        let admin = auth.users.iter().find(|u| u.role == Role::Admin).unwrap();
        assert_eq!(faculty.password, "changed");
        assert_eq!(admin.password, "admin123");
    }
}
