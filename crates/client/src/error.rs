/// Errors from the redistribution service HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Service error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the `{ "error", "code" }` body.
        code: Option<String>,
        /// Human-readable message, or the raw body when it is not JSON.
        message: String,
    },

    /// A 2xx body could not be decoded into the expected type.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client configuration is invalid.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}
