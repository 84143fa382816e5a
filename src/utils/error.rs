use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdsError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Google Ads API returned {status}: {body}")]
    ApiStatusError { status: u16, body: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{message}")]
    ConfigError { message: String },

    #[error("Missing required environment variable: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} (got '{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("GAQL query failed: {message}\nQuery: {query}")]
    QueryError { message: String, query: String },

    #[error("Query timed out after {seconds} seconds")]
    TimeoutError { seconds: u64 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },
}

pub type Result<T> = std::result::Result<T, AdsError>;
