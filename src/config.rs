//! Configuration and settings management
//!
//! Loads settings from environment variables and optional config files.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Chat notified when a new user links their account
    pub telegram_admin_chat_id: Option<i64>,

    /// Base URL of the web client, used for confess and preview links
    pub client_base_url: String,

    /// HMAC secret for access and refresh tokens
    pub jwt_secret: String,

    /// SQLite database file path
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Media storage access key ID
    pub s3_access_key_id: Option<String>,
    /// Media storage secret access key
    pub s3_secret_access_key: Option<String>,
    /// Media storage endpoint URL
    pub s3_endpoint_url: Option<String>,
    /// Media storage bucket name
    pub s3_bucket_name: Option<String>,
    /// Public base URL under which uploaded objects are reachable
    pub s3_public_base_url: Option<String>,
}

fn default_database_url() -> String {
    "konfess.db".to_string()
}

const fn default_port() -> u16 {
    3000
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(File::with_name("config/default").required(false))
            // Add in the current environment file
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked into git
            .add_source(File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of APP)
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Also add settings from environment variables directly (without prefix)
            // ignore_empty treats empty env vars as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let mut settings: Self = s.try_deserialize()?;

        // Fallback: check environment variables directly if config didn't
        // pick them up; empty values count as unset.
        if settings.s3_endpoint_url.is_none() {
            settings.s3_endpoint_url = non_empty_env("S3_ENDPOINT_URL");
        }
        if settings.s3_access_key_id.is_none() {
            settings.s3_access_key_id = non_empty_env("S3_ACCESS_KEY_ID");
        }
        if settings.s3_secret_access_key.is_none() {
            settings.s3_secret_access_key = non_empty_env("S3_SECRET_ACCESS_KEY");
        }
        if settings.s3_bucket_name.is_none() {
            settings.s3_bucket_name = non_empty_env("S3_BUCKET_NAME");
        }
        if settings.s3_public_base_url.is_none() {
            settings.s3_public_base_url = non_empty_env("S3_PUBLIC_BASE_URL");
        }

        Ok(settings)
    }

    /// Socket address the HTTP server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
