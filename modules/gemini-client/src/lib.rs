pub mod error;
pub mod schema;
pub(crate) mod types;

pub use error::{GeminiError, Result};
pub use schema::ResponseSchema;

use std::future::Future;
use std::time::Duration;

use error::classify_status;
use types::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Tool};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Bounded exponential backoff for rate-limited calls.
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

async fn with_retry<T, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T>
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
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Gemini call rate limited, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.multiplier);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Strip markdown code fences from a model response.
pub(crate) fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_URL.to_string(),
            temperature: 0.3,
            max_output_tokens: 2048,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Schema-constrained extraction. Sends the prompt with the JSON schema of
    /// `T` and optional Google-Search grounding; any payload that does not
    /// deserialize into `T` is a schema error, never coerced.
    pub async fn extract<T: ResponseSchema>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        use_search: bool,
    ) -> Result<T> {
        let text = with_retry(&self.retry, || {
            self.generate_once::<T>(system_prompt, user_prompt, use_search)
        })
        .await?;

        serde_json::from_str(strip_code_blocks(&text))
            .map_err(|e| GeminiError::Schema(format!("failed to deserialize response: {e}")))
    }

    async fn generate_once<T: ResponseSchema>(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        use_search: bool,
    ) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(user_prompt)],
            system_instruction: Some(Content::system(system_prompt)),
            tools: use_search.then(|| vec![Tool::google_search()]),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
                response_mime_type: "application/json".to_string(),
                response_schema: Some(T::gemini_schema()),
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );

        tracing::debug!(model = %self.model, use_search, "Gemini generateContent request");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GeminiError::Schema(format!("malformed response envelope: {e}")))?;

        parsed
            .text()
            .ok_or_else(|| GeminiError::Schema("response contained no text".to_string()))
    }
}
