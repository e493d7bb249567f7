/*!
 * Client implementations for the remote completion services.
 *
 * The engine only depends on the `CompletionClient` trait: one prompt
 * and one model id in, plain text plus token usage out. Concrete
 * clients:
 * - `gemini`: Google-family completion service
 * - `openrouter`: aggregator service (OpenAI-compatible wire shape)
 *
 * Both clients request plain-text responses. JSON-object response modes
 * are deliberately never used because observed providers normalize
 * whitespace inside JSON strings, which destroys indentation.
 */

pub mod gemini;
pub mod openrouter;

use async_trait::async_trait;

use crate::errors::ProviderError;

/// One completion from a provider
#[derive(Clone, Debug, Default)]
pub struct Completion {
    /// Raw response text
    pub text: String,
    /// Prompt tokens billed, zero when the provider reports none
    pub input_tokens: u64,
    /// Completion tokens billed, zero when the provider reports none
    pub output_tokens: u64,
    /// Total tokens billed, zero when the provider reports none
    pub total_tokens: u64,
}

/// A remote completion service the engine can drive
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion; retries and timeouts are the caller's concern
    async fn complete(&self, prompt: &str, model: &str) -> Result<Completion, ProviderError>;
}

/// Map a reqwest transport error into the provider error taxonomy
pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::ConnectionError(format!("Request timed out: {}", e))
    } else if e.is_connect() {
        ProviderError::ConnectionError(format!("Connection failed: {}", e))
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Map a non-success HTTP status plus body into the provider error taxonomy
pub(crate) fn status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status.as_u16() {
        429 => ProviderError::RateLimitExceeded(body),
        401 | 403 => ProviderError::AuthenticationError(body),
        code => ProviderError::ApiError {
            status_code: code,
            message: body,
        },
    }
}
