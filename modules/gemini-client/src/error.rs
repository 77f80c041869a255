use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeminiError>;

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Invalid or missing Gemini API key")]
    Auth,

    #[error("Gemini API quota exceeded")]
    QuotaExceeded,

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Response did not match the expected schema: {0}")]
    Schema(String),
}

impl GeminiError {
    /// Only transient rate limits are retried; schema failures and everything
    /// terminal surface immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GeminiError::RateLimited(_))
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        GeminiError::Network(err.to_string())
    }
}

/// Map an error response to the taxonomy. A 429 whose body names an exhausted
/// quota is a billing problem, not a transient rate limit.
pub(crate) fn classify_status(status: u16, body: &str) -> GeminiError {
    match status {
        401 | 403 => GeminiError::Auth,
        429 => {
            let lower = body.to_ascii_lowercase();
            if lower.contains("quota") || lower.contains("resource_exhausted") {
                GeminiError::QuotaExceeded
            } else {
                GeminiError::RateLimited(body.to_string())
            }
        }
        _ => GeminiError::Api {
            status,
            message: body.to_string(),
        },
    }
}
