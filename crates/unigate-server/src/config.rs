//! Server configuration loaded from the environment.

use std::env;

use unigate_auth::{AuthConfig, SmtpConfig};
use unigate_db::DbConfig;

/// Full server configuration: bind address plus the collaborator
/// configs handed to the db, mail, and auth layers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db: DbConfig,
    pub smtp: SmtpConfig,
    pub auth: AuthConfig,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl ServerConfig {
    /// Read configuration from `UNIGATE_*` environment variables,
    /// falling back to development defaults.
    pub fn from_env() -> Self {
        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: env_or("UNIGATE_DB_URL", &db_defaults.url),
            namespace: env_or("UNIGATE_DB_NAMESPACE", &db_defaults.namespace),
            database: env_or("UNIGATE_DB_DATABASE", &db_defaults.database),
            username: env_or("UNIGATE_DB_USERNAME", &db_defaults.username),
            password: env_or("UNIGATE_DB_PASSWORD", &db_defaults.password),
        };

        let smtp = SmtpConfig {
            relay: env_or("UNIGATE_SMTP_RELAY", "localhost"),
            username: env_or("UNIGATE_SMTP_USERNAME", ""),
            password: env_or("UNIGATE_SMTP_PASSWORD", ""),
            from: env_or("UNIGATE_SMTP_FROM", "no-reply@unigate.local"),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            jwt_private_key_pem: env_or("UNIGATE_JWT_PRIVATE_KEY_PEM", ""),
            jwt_public_key_pem: env_or("UNIGATE_JWT_PUBLIC_KEY_PEM", ""),
            token_lifetime_secs: env::var("UNIGATE_TOKEN_LIFETIME_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(auth_defaults.token_lifetime_secs),
            jwt_issuer: env_or("UNIGATE_JWT_ISSUER", &auth_defaults.jwt_issuer),
            pepper: env::var("UNIGATE_PASSWORD_PEPPER").ok().filter(|p| !p.is_empty()),
            max_failed_login_attempts: env::var("UNIGATE_MAX_FAILED_LOGIN_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(auth_defaults.max_failed_login_attempts),
            role_authorities: auth_defaults.role_authorities,
        };

        Self {
            bind_addr: env_or("UNIGATE_BIND_ADDR", "0.0.0.0:8080"),
            db,
            smtp,
            auth,
        }
    }
}
