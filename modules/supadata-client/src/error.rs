use thiserror::Error;

pub type Result<T> = std::result::Result<T, SupadataError>;

#[derive(Debug, Error)]
pub enum SupadataError {
    #[error("Invalid or missing Supadata API key")]
    Auth,

    #[error("Supadata API credits exhausted")]
    CreditsExhausted,

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupadataError {
    /// Whether a fresh attempt could plausibly succeed. Auth, credits, and
    /// not-found are terminal; rate limits and generic API/transport failures
    /// are worth retrying with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SupadataError::RateLimited(_) | SupadataError::Network(_) | SupadataError::Api { .. }
        )
    }
}

impl From<reqwest::Error> for SupadataError {
    fn from(err: reqwest::Error) -> Self {
        SupadataError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SupadataError {
    fn from(err: serde_json::Error) -> Self {
        SupadataError::Parse(err.to_string())
    }
}

/// Map an error response status to the taxonomy. The body text is carried for
/// diagnostics on the retryable kinds.
pub(crate) fn classify_status(status: u16, body: &str) -> SupadataError {
    match status {
        401 => SupadataError::Auth,
        402 => SupadataError::CreditsExhausted,
        404 => SupadataError::NotFound(body.to_string()),
        429 => SupadataError::RateLimited(body.to_string()),
        _ => SupadataError::Api {
            status,
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_credits_are_terminal() {
        assert!(!classify_status(401, "unauthorized").is_retryable());
        assert!(!classify_status(402, "credits").is_retryable());
        assert!(!classify_status(404, "no transcript").is_retryable());
    }

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        assert!(classify_status(429, "slow down").is_retryable());
        assert!(classify_status(500, "oops").is_retryable());
        assert!(classify_status(503, "unavailable").is_retryable());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(classify_status(401, ""), SupadataError::Auth));
        assert!(matches!(
            classify_status(402, ""),
            SupadataError::CreditsExhausted
        ));
        assert!(matches!(
            classify_status(404, ""),
            SupadataError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(429, ""),
            SupadataError::RateLimited(_)
        ));
        assert!(matches!(
            classify_status(500, ""),
            SupadataError::Api { status: 500, .. }
        ));
    }
}
