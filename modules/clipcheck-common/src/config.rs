use std::env;
use std::time::Duration;

use crate::types::CredibilityThresholds;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Supadata scraping API
    pub supadata_api_key: String,
    pub supadata_base_url: String,

    // Gemini analysis API
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_temperature: f32,
    pub gemini_max_output_tokens: u32,
    pub gemini_use_search: bool,

    // Request handling
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub retry_backoff: f64,

    // Result cache
    pub cache_ttl: Duration,
    pub cache_max_size: usize,

    // Credibility bucketing
    pub credibility_thresholds: CredibilityThresholds,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            supadata_api_key: required_env("SUPADATA_API_KEY"),
            supadata_base_url: env_or("SUPADATA_BASE_URL", "https://api.supadata.ai/v1"),
            gemini_api_key: required_env("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-3-flash-preview"),
            gemini_temperature: parsed_env("GEMINI_TEMPERATURE", 0.3),
            gemini_max_output_tokens: parsed_env("GEMINI_MAX_OUTPUT_TOKENS", 2048),
            gemini_use_search: parsed_env("GEMINI_USE_SEARCH", true),
            request_timeout: Duration::from_secs(parsed_env("REQUEST_TIMEOUT", 30u64)),
            max_retries: parsed_env("MAX_RETRIES", 3),
            retry_delay: Duration::from_secs_f64(parsed_env("RETRY_DELAY", 2.0)),
            retry_backoff: parsed_env("RETRY_BACKOFF", 2.0),
            cache_ttl: Duration::from_secs(parsed_env("CACHE_TTL", 3600u64)),
            cache_max_size: parsed_env("CACHE_MAX_SIZE", 1000usize),
            credibility_thresholds: CredibilityThresholds {
                high: parsed_env("CREDIBILITY_HIGH_THRESHOLD", 0.8),
                medium: parsed_env("CREDIBILITY_MEDIUM_THRESHOLD", 0.5),
            },
            web_host: env_or("WEB_HOST", "0.0.0.0"),
            web_port: parsed_env("WEB_PORT", 8000u16),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
