use thiserror::Error;

/// Pipeline-level error taxonomy. `Clone` because single-flight cache waiters
/// receive a shared copy of the leader's failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("Invalid video URL: {0}")]
    InvalidUrl(String),

    #[error("Upstream authentication failed: {0}")]
    Auth(String),

    #[error("API credits exhausted: {0}")]
    CreditsExhausted(String),

    #[error("AI service quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Rate limited after retries: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Analysis response failed schema validation: {0}")]
    SchemaValidation(String),

    #[error("Request deadline exceeded after {0}ms")]
    Timeout(u64),

    #[error("Upstream error: {0}")]
    Upstream(String),
}
