//! Application configuration management.
//!
//! All runtime configuration comes from environment variables. Sensitive
//! fields (cookie and CSRF secrets) must never be logged and should be stored
//! in a secret management system in production.

use envconfig::Envconfig;
use std::sync::OnceLock;

/// Environment-driven application configuration.
#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Base URL of the remote booking/authentication API (NON-SENSITIVE)
    /// Example: "http://localhost:8080/api"
    pub api_base_url: String,

    /// Host address for web server binding (NON-SENSITIVE)
    #[envconfig(default = "0.0.0.0")]
    pub web_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "8443")]
    pub web_server_port: u16,

    /// Path to SSL private key file, only read in prod (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file, only read in prod (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: identity-cookie encryption password (UUID format)
    ///
    /// The identity cookie is the durable storage for the session token, so
    /// its key is derived from this configured secret rather than generated
    /// per boot; otherwise every restart would log all users out.
    pub cookie_pass: String,

    /// 🔒 SENSITIVE: identity-cookie encryption salt (UUID format)
    pub cookie_salt: String,

    /// 🔒 SENSITIVE: CSRF protection password (UUID format)
    pub csrf_pass: String,

    /// 🔒 SENSITIVE: CSRF protection salt (UUID format)
    pub csrf_salt: String,

    /// How long an expired token may still be exchanged for a fresh one
    /// before the user has to authenticate again (NON-SENSITIVE)
    #[envconfig(default = "7")]
    pub refresh_token_lifetime_days: i64,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Refresh validity window as a chrono duration
    pub fn refresh_token_lifetime(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::days(self.refresh_token_lifetime_days)
    }

}

/// Global application configuration, set once at startup by [init_config]
pub static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub fn init_config() -> anyhow::Result<()> {
    let config = AppConfig::init_from_env()?;

    APP_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("app config was already initialized"))
}
