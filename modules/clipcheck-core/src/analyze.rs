use std::collections::HashSet;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use url::Url;

use clipcheck_common::{
    CheckError, Claim, CredibilityLevel, CredibilityThresholds, FactCheckResult, RawVideoRecord,
    Source, Verdict,
};
use gemini_client::{GeminiClient, GeminiError};

use crate::prompt::{build_prompt, SYSTEM_PROMPT};

/// Cap on surfaced claims; the model may extract more, we keep the most
/// important ones.
pub const MAX_CLAIMS: usize = 5;

/// Analysis seam so the pipeline can be exercised without a model call.
#[async_trait]
pub trait ClaimAnalyzer: Send + Sync {
    async fn analyze(&self, record: &RawVideoRecord) -> Result<FactCheckResult, CheckError>;
}

// --- Model output schema ---

#[derive(Debug, Deserialize, JsonSchema)]
pub(crate) struct VerdictPayload {
    pub credibility_score: f64,
    pub summary: String,
    pub claims: Vec<ClaimPayload>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(crate) struct ClaimPayload {
    pub claim: String,
    pub verdict: Verdict,
    pub justification: String,
    pub importance: f64,
    pub sources: Vec<SourcePayload>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(crate) struct SourcePayload {
    pub title: String,
    pub publisher: String,
    pub url: Option<String>,
}

/// Search-results fallback for sources the model could not cite directly
/// (Google "I'm Feeling Lucky" lands on the top hit).
fn search_url(title: &str, publisher: &str) -> String {
    let mut url = Url::parse("https://www.google.com/search").expect("valid base url");
    url.query_pairs_mut()
        .append_pair("q", &format!("{title} {publisher}"))
        .append_pair("btnI", "1");
    url.to_string()
}

/// Shape the raw model payload into the final result: order claims by
/// importance (stable, ties keep model order), cap at `max_claims`,
/// deduplicate sources across claims by (title, publisher), and derive the
/// credibility bucket from the score — never from the model.
pub(crate) fn post_process(
    payload: VerdictPayload,
    record: &RawVideoRecord,
    thresholds: CredibilityThresholds,
    max_claims: usize,
) -> FactCheckResult {
    let mut ranked = payload.claims;
    ranked.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(max_claims);

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let claims: Vec<Claim> = ranked
        .into_iter()
        .map(|c| {
            let sources = c
                .sources
                .into_iter()
                .filter(|s| seen.insert((s.title.clone(), s.publisher.clone())))
                .map(|s| {
                    let url = match s.url {
                        Some(u) if !u.trim().is_empty() => u,
                        _ => search_url(&s.title, &s.publisher),
                    };
                    Source {
                        title: s.title,
                        publisher: s.publisher,
                        url,
                    }
                })
                .collect();
            Claim {
                text: c.claim,
                verdict: c.verdict,
                justification: c.justification,
                importance: c.importance.clamp(0.0, 1.0),
                sources,
            }
        })
        .collect();

    let score = payload.credibility_score.clamp(0.0, 1.0);
    let analyzed_text = record
        .transcript
        .clone()
        .or_else(|| record.title.clone())
        .or_else(|| record.description.clone());

    FactCheckResult {
        video_url: record.url.clone(),
        credibility_score: score,
        credibility_level: CredibilityLevel::from_score(score, thresholds),
        summary: payload.summary,
        claims,
        has_transcript: record.has_transcript,
        analyzed_text,
        processing_time_ms: None,
    }
}

pub(crate) fn map_analysis_error(err: GeminiError) -> CheckError {
    match err {
        GeminiError::Auth => CheckError::Auth(err.to_string()),
        GeminiError::QuotaExceeded => CheckError::QuotaExceeded(err.to_string()),
        GeminiError::RateLimited(msg) => CheckError::RateLimited(msg),
        GeminiError::Schema(msg) => CheckError::SchemaValidation(msg),
        GeminiError::Network(msg) => CheckError::Upstream(msg),
        GeminiError::Api { status, message } => {
            CheckError::Upstream(format!("status {status}: {message}"))
        }
    }
}

/// Grounded Gemini analysis: deterministic prompt in, schema-validated
/// verdict out.
pub struct GeminiAnalyzer {
    client: GeminiClient,
    thresholds: CredibilityThresholds,
    use_search: bool,
    max_claims: usize,
}

impl GeminiAnalyzer {
    pub fn new(client: GeminiClient, thresholds: CredibilityThresholds, use_search: bool) -> Self {
        Self {
            client,
            thresholds,
            use_search,
            max_claims: MAX_CLAIMS,
        }
    }

    pub fn with_max_claims(mut self, max_claims: usize) -> Self {
        self.max_claims = max_claims;
        self
    }
}

#[async_trait]
impl ClaimAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, record: &RawVideoRecord) -> Result<FactCheckResult, CheckError> {
        let prompt = build_prompt(record);
        tracing::info!(
            video_id = %record.video_id,
            has_transcript = record.has_transcript,
            "Starting fact-check analysis"
        );

        let payload: VerdictPayload = self
            .client
            .extract(SYSTEM_PROMPT, &prompt, self.use_search)
            .await
            .map_err(map_analysis_error)?;

        Ok(post_process(payload, record, self.thresholds, self.max_claims))
    }
}
