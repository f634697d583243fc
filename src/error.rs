//! Error types for brandbot.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Activity store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// LINE channel errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send reply: {reason}")]
    SendFailed { reason: String },

    #[error("LINE API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// Gemini provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Gemini request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Gemini API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid response from Gemini: {0}")]
    InvalidResponse(String),
}

/// Tool dispatch errors.
///
/// `InvalidArguments` is a contract violation by the model, distinct from
/// a lookup that simply matches nothing (which is a normal text reply).
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} is not registered")]
    UnknownTool { name: String },

    #[error("Invalid arguments for tool {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("Tool {name} execution failed: {reason}")]
    ExecutionFailed { name: String, reason: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
