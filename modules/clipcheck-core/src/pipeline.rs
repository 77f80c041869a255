use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use clipcheck_common::{CheckError, FactCheckResult, RawVideoRecord};

use crate::analyze::ClaimAnalyzer;
use crate::cache::ResultCache;
use crate::fetch::{fetch_video, VideoFetcher};
use crate::normalize::UrlNormalizer;

/// The request pipeline: normalize → cache → fetch → analyze → store.
/// One instance is created at process start and shared across requests;
/// the cache is its only mutable state.
pub struct CheckPipeline {
    normalizer: UrlNormalizer,
    fetcher: Arc<dyn VideoFetcher>,
    analyzer: Arc<dyn ClaimAnalyzer>,
    cache: ResultCache,
    request_timeout: Duration,
}

impl CheckPipeline {
    pub fn new(
        normalizer: UrlNormalizer,
        fetcher: Arc<dyn VideoFetcher>,
        analyzer: Arc<dyn ClaimAnalyzer>,
        cache: ResultCache,
        request_timeout: Duration,
    ) -> Self {
        Self {
            normalizer,
            fetcher,
            analyzer,
            cache,
            request_timeout,
        }
    }

    /// Full credibility check. The whole run — normalization, fetch,
    /// analysis — is bounded by the request timeout; a timed-out or failed
    /// run never writes to the cache.
    pub async fn check(&self, raw_url: &str) -> Result<FactCheckResult, CheckError> {
        let started = Instant::now();
        self.bounded(self.check_inner(raw_url, started)).await
    }

    async fn check_inner(
        &self,
        raw_url: &str,
        started: Instant,
    ) -> Result<FactCheckResult, CheckError> {
        let identity = self.normalizer.normalize(raw_url).await?;
        tracing::info!(video_id = %identity.video_id, url = %identity.canonical_url, "Processing check request");

        let fetcher = self.fetcher.clone();
        let analyzer = self.analyzer.clone();
        let compute_identity = identity.clone();

        self.cache
            .get_or_compute(identity.cache_key(), async move {
                let record = fetch_video(fetcher.as_ref(), &compute_identity).await?;
                let mut result = analyzer.analyze(&record).await?;
                result.processing_time_ms = Some(started.elapsed().as_millis() as u64);
                Ok(result)
            })
            .await
    }

    /// Fetch-only path: normalize and scrape, no analysis, no caching.
    pub async fn scrape_only(&self, raw_url: &str) -> Result<RawVideoRecord, CheckError> {
        self.bounded(async {
            let identity = self.normalizer.normalize(raw_url).await?;
            fetch_video(self.fetcher.as_ref(), &identity).await
        })
        .await
    }

    /// Analysis-only path for callers that already hold a record.
    pub async fn analyze_only(
        &self,
        record: &RawVideoRecord,
    ) -> Result<FactCheckResult, CheckError> {
        let started = Instant::now();
        self.bounded(async {
            let mut result = self.analyzer.analyze(record).await?;
            result.processing_time_ms = Some(started.elapsed().as_millis() as u64);
            Ok(result)
        })
        .await
    }

    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T, CheckError>>,
    ) -> Result<T, CheckError> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CheckError::Timeout(self.request_timeout.as_millis() as u64)),
        }
    }
}
