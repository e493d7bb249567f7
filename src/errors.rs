/*!
 * Error types for the doctran engine.
 *
 * Custom error types for the different failure domains, using the
 * thiserror crate for ergonomic error definitions. Per-batch LLM
 * failures are absorbed into `BatchResult::failed` rather than
 * propagated; only validation, loader and serializer errors abort
 * a translation request.
 */

use thiserror::Error;

/// Errors that can occur when talking to a completion provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The per-attempt timeout elapsed before the provider answered
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the executor should retry after this error.
    ///
    /// Client-side errors other than rate limiting are terminal;
    /// everything transport-shaped is worth another attempt.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::Timeout(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code == 429 || *status_code >= 500,
            Self::RequestFailed(_) | Self::ParseError(_) => true,
            Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur while reading or writing a DOCX package
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The payload is not a readable zip/OPC container
    #[error("Not a valid DOCX package: {0}")]
    BadPackage(String),

    /// The main document part is missing from the package
    #[error("Package has no word/document.xml part")]
    MissingDocumentPart,

    /// XML inside a package part could not be parsed
    #[error("Malformed XML in {part}: {message}")]
    MalformedXml {
        /// Package part name
        part: String,
        /// Underlying parser message
        message: String,
    },
}

/// Request-level errors surfaced to the caller
#[derive(Error, Debug)]
pub enum TranslateError {
    /// A required request field is missing or unusable
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The DOCX payload could not be decoded or parsed
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Serializing the mutated document failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for TranslateError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
