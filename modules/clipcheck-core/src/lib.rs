pub mod analyze;
pub mod cache;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod prompt;

pub use analyze::{ClaimAnalyzer, GeminiAnalyzer};
pub use cache::ResultCache;
pub use fetch::{fetch_video, VideoFetcher};
pub use normalize::{HttpRedirectResolver, RedirectResolver, UrlNormalizer};
pub use pipeline::CheckPipeline;
