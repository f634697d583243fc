//! Configuration types, read once from the environment at startup.
//!
//! Credentials live in explicit config structs handed to constructors;
//! nothing reads the environment after `AppConfig::from_env` returns.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// LINE Messaging API credentials.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Channel secret used to verify webhook signatures.
    pub channel_secret: SecretString,
    /// Long-lived channel access token for the reply API.
    pub access_token: SecretString,
}

/// Gemini API configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key. `None` means the bot answers with a fixed operator-facing
    /// message instead of calling the model.
    pub api_key: Option<SecretString>,
    /// Model name, e.g. "gemini-2.5-flash".
    pub model: String,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub line: LineConfig,
    pub gemini: GeminiConfig,
    /// Path of the local activities database.
    pub db_path: String,
    /// Port the webhook server binds on.
    pub port: u16,
}

impl AppConfig {
    /// Read configuration from environment variables.
    ///
    /// `LINE_CHANNEL_SECRET` and `LINE_CHANNEL_ACCESS_TOKEN` are required.
    /// A missing `GEMINI_API_KEY` is tolerated so the webhook can still
    /// acknowledge events while the operator fixes credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let channel_secret = require_env("LINE_CHANNEL_SECRET")?;
        let access_token = require_env("LINE_CHANNEL_ACCESS_TOKEN")?;

        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .map(SecretString::from);
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let db_path =
            std::env::var("BRANDBOT_DB_PATH").unwrap_or_else(|_| "./data/brandbot.db".to_string());

        let port = match std::env::var("BRANDBOT_PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "BRANDBOT_PORT".to_string(),
                message: format!("not a port number: {v}"),
            })?,
            Err(_) => 8000,
        };

        Ok(Self {
            line: LineConfig {
                channel_secret: SecretString::from(channel_secret),
                access_token: SecretString::from(access_token),
            },
            gemini: GeminiConfig { api_key, model },
            db_path,
            port,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}
