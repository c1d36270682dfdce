//! Error types for the DigitalNZ client.

/// Errors that can occur when building requests for, or decoding responses
/// from, the DigitalNZ API.
#[derive(Debug, thiserror::Error)]
pub enum DnzError {
    /// The requested API version has no argument schema.
    #[error("Unknown API version: {0}")]
    UnknownVersion(String),

    /// One or more option keys are not permitted for the endpoint/version pair.
    #[error("Valid options for {endpoint} are: {}, provided: {}", valid.join(", "), provided.join(", "))]
    InvalidOption {
        endpoint: String,
        provided: Vec<String>,
        valid: Vec<String>,
    },

    /// A path template placeholder has no matching option.
    #[error("Required argument missing: {0}")]
    MissingArgument(String),

    /// The API rejected the configured key (HTTP 401).
    #[error("Invalid API key: {api_key}")]
    InvalidApiKey { api_key: String },

    /// The API returned a non-success status code.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed (network, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for Results using [`DnzError`].
pub type Result<T> = std::result::Result<T, DnzError>;
