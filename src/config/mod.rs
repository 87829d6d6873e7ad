use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub upload_dir: String,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// Shared secret gating `POST /register`. Empty closes registration.
    #[serde(skip_serializing)]
    pub registration_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Upper bound on hops for every parent/child traversal.
    pub max_depth: u32,
    pub default_subtree_depth: u32,
}

/// Tokens live four weeks.
const DEFAULT_JWT_EXPIRY_HOURS: u64 = 24 * 28;

/// Ten years; keeps token expiry arithmetic in range.
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 10;

fn clamp_expiry_hours(hours: u64) -> u64 {
    hours.min(MAX_JWT_EXPIRY_HOURS)
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
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_AUTO_MIGRATE") {
            self.database.auto_migrate = v.parse().unwrap_or(self.database.auto_migrate);
        }

        // API overrides
        if let Some(port) = env::var("EXHIBIT_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_UPLOAD_DIR") {
            self.api.upload_dir = v;
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = clamp_expiry_hours(v.parse().unwrap_or(self.security.jwt_expiry_hours));
        }
        if let Ok(v) = env::var("REGISTRATION_SECRET") {
            self.security.registration_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Catalog overrides
        if let Ok(v) = env::var("CATALOG_MAX_DEPTH") {
            self.catalog.max_depth = v.parse().unwrap_or(self.catalog.max_depth);
        }
        if let Ok(v) = env::var("CATALOG_DEFAULT_SUBTREE_DEPTH") {
            self.catalog.default_subtree_depth = v.parse().unwrap_or(self.catalog.default_subtree_depth);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                auto_migrate: true,
            },
            api: ApiConfig {
                port: 3000,
                upload_dir: "uploads".to_string(),
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: "exhibit-dev-secret".to_string(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
                registration_secret: "exhibit-dev-register".to_string(),
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
            catalog: CatalogConfig {
                max_depth: 64,
                default_subtree_depth: 1,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                auto_migrate: true,
            },
            api: ApiConfig {
                port: 3000,
                upload_dir: "uploads".to_string(),
                max_request_size_bytes: 10 * 1024 * 1024,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
                registration_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
            catalog: CatalogConfig {
                max_depth: 64,
                default_subtree_depth: 1,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                auto_migrate: false,
            },
            api: ApiConfig {
                port: 3000,
                upload_dir: "uploads".to_string(),
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: DEFAULT_JWT_EXPIRY_HOURS,
                registration_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
            catalog: CatalogConfig {
                max_depth: 32,
                default_subtree_depth: 1,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert!(config.database.auto_migrate);
        assert_eq!(config.security.jwt_expiry_hours, 672);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(config.security.registration_secret.is_empty());
        assert!(!config.database.auto_migrate);
        assert!(config.catalog.max_depth > config.catalog.default_subtree_depth);
    }

    #[test]
    fn expiry_hours_are_clamped() {
        assert_eq!(clamp_expiry_hours(672), 672);
        assert_eq!(clamp_expiry_hours(u64::MAX), MAX_JWT_EXPIRY_HOURS);
    }

    #[test]
    fn secrets_are_not_serialized() {
        let value = serde_json::to_value(AppConfig::development()).unwrap();
        assert!(value["security"].get("jwt_secret").is_none());
        assert!(value["security"].get("registration_secret").is_none());
    }
}
