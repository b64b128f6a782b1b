use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

/// Adapter errors.
///
/// Transport-level variants mirror the backend's HTTP status taxonomy; the
/// fallback orchestrator decides which of them justify trying the next
/// candidate model (see `fallback::is_retryable`).
#[derive(Debug, Error)]
pub enum LlmError {
    /// Unified content that cannot be mapped onto backend messages.
    #[error("Unsupported content: {0}")]
    Schema(String),

    /// Tool-call arguments that stayed unparsable even after repair. Carries
    /// the offending raw text for diagnostics.
    #[error("Unparsable tool-call arguments: {raw}")]
    ArgumentParse { raw: String },

    /// Authentication failed (missing or invalid API key).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found at the backend.
    #[error("{0}")]
    ModelNotFound(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    /// Insufficient quota or credits.
    #[error("Insufficient quota: {0}")]
    InsufficientQuota(String),

    /// Backend API returned an error not covered by a dedicated variant.
    #[error("API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The streaming transport failed mid-call.
    #[error("Streaming failed: {0}")]
    StreamingFailed(String),

    /// Backend-side internal error. If Some(message), it came from the
    /// backend and can be shown; if None, it is an adapter-internal failure
    /// and should not leak details.
    #[error("Internal server error")]
    InternalError(Option<String>),

    /// Every candidate model failed; wraps the last observed error.
    #[error("All candidate models failed; last attempt '{model}': {source}")]
    AllModelsExhausted {
        model: String,
        #[source]
        source: Box<LlmError>,
    },

    /// The operation is not supported by the OpenAI-compatible path.
    #[error("{0} is not supported by the OpenAI-compatible path")]
    NotImplemented(&'static str),

    /// A required credential was absent for the selected auth variant.
    #[error(transparent)]
    Configuration(#[from] config::Error),
}
