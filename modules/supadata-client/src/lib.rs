pub mod error;
pub mod types;

pub use error::{Result, SupadataError};
pub use types::{Transcript, VideoMetadata};

use std::future::Future;
use std::time::Duration;

use error::classify_status;
use types::{MetadataResponse, TranscriptResponse};

const DEFAULT_BASE_URL: &str = "https://api.supadata.ai/v1";

/// Bounded exponential backoff for retryable failures. No jitter: the
/// call volume here is one video per user action, not a thundering herd.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

/// Run `op` until it succeeds, a terminal error surfaces, or attempts run out.
/// Each attempt is independent; delays grow by `multiplier` between attempts.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = policy.base_delay;
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                tracing::warn!(
                    what,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Supadata call failed, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.multiplier);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

pub struct SupadataClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl SupadataClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch video metadata (caption, author, engagement counts).
    pub async fn fetch_metadata(&self, video_url: &str) -> Result<VideoMetadata> {
        let meta = with_retry(&self.retry, "metadata", || self.metadata_once(video_url)).await?;
        tracing::info!(url = video_url, "Metadata fetched");
        Ok(meta)
    }

    async fn metadata_once(&self, video_url: &str) -> Result<VideoMetadata> {
        let endpoint = format!("{}/metadata", self.base_url);
        let resp = self
            .http
            .get(&endpoint)
            .query(&[("url", video_url)])
            .header("x-api-key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        let raw: MetadataResponse = serde_json::from_str(&body)?;
        Ok(raw.into())
    }

    /// Fetch the plain-text transcript. `NotFound` means the video simply has
    /// no captions; callers decide whether that is fatal.
    pub async fn fetch_transcript(&self, video_url: &str) -> Result<Transcript> {
        let transcript =
            with_retry(&self.retry, "transcript", || self.transcript_once(video_url)).await?;
        tracing::info!(
            url = video_url,
            language = transcript.language.as_deref().unwrap_or("unknown"),
            "Transcript fetched"
        );
        Ok(transcript)
    }

    async fn transcript_once(&self, video_url: &str) -> Result<Transcript> {
        let endpoint = format!("{}/transcript", self.base_url);
        let resp = self
            .http
            .get(&endpoint)
            // Plain text, English, native captions first with AI fallback.
            .query(&[
                ("url", video_url),
                ("text", "true"),
                ("lang", "en"),
                ("mode", "auto"),
            ])
            .header("x-api-key", &self.api_key)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        let raw: TranscriptResponse = serde_json::from_str(&body)?;
        match raw.content {
            Some(text) if !text.trim().is_empty() => Ok(Transcript {
                text,
                language: raw.lang,
            }),
            _ => Err(SupadataError::NotFound(
                "transcript response contained no text".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retry_recovers_from_rate_limits() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(SupadataError::RateLimited("slow down".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_stops_after_max_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(SupadataError::Api { status: 500, message: "boom".into() }) }
        })
        .await;

        assert!(matches!(result, Err(SupadataError::Api { status: 500, .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_errors_are_not_retried() {
        let attempts = AtomicU32::new(0);
        let result: Result<()> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(SupadataError::Auth) }
        })
        .await;

        assert!(matches!(result, Err(SupadataError::Auth)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_delays_grow_between_attempts() {
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let result: Result<()> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(SupadataError::RateLimited("".into())) }
        })
        .await;

        assert!(result.is_err());
        // 100ms after attempt 1, 200ms after attempt 2, none after the last.
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }
}
