use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clipcheck_common::Config;
use clipcheck_core::{
    CheckPipeline, GeminiAnalyzer, HttpRedirectResolver, ResultCache, UrlNormalizer,
};
use gemini_client::GeminiClient;
use supadata_client::SupadataClient;

mod rest;

pub struct AppState {
    pub pipeline: CheckPipeline,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("clipcheck=info".parse()?))
        .init();

    let config = Config::from_env();

    let supadata = SupadataClient::new(config.supadata_api_key.clone())
        .with_base_url(config.supadata_base_url.clone())
        .with_timeout(config.request_timeout)
        .with_retry_policy(supadata_client::RetryPolicy {
            max_attempts: config.max_retries,
            base_delay: config.retry_delay,
            multiplier: config.retry_backoff,
        });

    let gemini = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .with_temperature(config.gemini_temperature)
        .with_max_output_tokens(config.gemini_max_output_tokens)
        .with_retry_policy(gemini_client::RetryPolicy {
            max_attempts: config.max_retries,
            base_delay: config.retry_delay,
            multiplier: config.retry_backoff,
        });

    let pipeline = CheckPipeline::new(
        UrlNormalizer::new(Arc::new(HttpRedirectResolver::new())),
        Arc::new(supadata),
        Arc::new(GeminiAnalyzer::new(
            gemini,
            config.credibility_thresholds,
            config.gemini_use_search,
        )),
        ResultCache::new(config.cache_ttl, config.cache_max_size),
        config.request_timeout,
    );

    let state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .route("/health", get(rest::health))
        .route("/check", post(rest::check))
        .route("/scrape-metadata", post(rest::scrape_metadata))
        .route("/fact-check", post(rest::fact_check))
        .with_state(state)
        // Permissive CORS: the caller is a browser extension content script.
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!(%addr, model = %config.gemini_model, "clipcheck API listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
