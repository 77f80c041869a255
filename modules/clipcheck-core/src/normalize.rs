use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use clipcheck_common::{CheckError, VideoIdentity};

/// Hosts that serve shortened share links and must be resolved via redirect.
const SHORT_LINK_HOSTS: &[&str] = &["vm.tiktok.com", "vt.tiktok.com"];

/// Hosts that carry the full `/@handle/video/{id}` path.
const VIDEO_HOSTS: &[&str] = &["tiktok.com", "www.tiktok.com", "m.tiktok.com"];

/// Hop bound for short-link resolution, against redirect loops.
const MAX_REDIRECT_HOPS: usize = 5;

const RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

static VIDEO_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(@[\w.\-]+)/video/(\d+)").expect("valid regex"));

/// Network seam for short-link resolution — the only impure step in
/// normalization.
#[async_trait]
pub trait RedirectResolver: Send + Sync {
    async fn resolve(&self, url: &Url) -> Result<Url, CheckError>;
}

/// Follows redirects manually with a bounded hop count.
pub struct HttpRedirectResolver {
    http: reqwest::Client,
}

impl HttpRedirectResolver {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build HTTP client");
        Self { http }
    }
}

impl Default for HttpRedirectResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RedirectResolver for HttpRedirectResolver {
    async fn resolve(&self, url: &Url) -> Result<Url, CheckError> {
        let mut current = url.clone();
        for _ in 0..MAX_REDIRECT_HOPS {
            let resp = self
                .http
                .head(current.clone())
                .timeout(RESOLVE_TIMEOUT)
                .send()
                .await
                .map_err(|e| {
                    CheckError::InvalidUrl(format!("failed to resolve short link: {e}"))
                })?;

            if !resp.status().is_redirection() {
                return Ok(current);
            }

            let location = resp
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    CheckError::InvalidUrl("redirect without Location header".to_string())
                })?;

            current = current
                .join(location)
                .map_err(|e| CheckError::InvalidUrl(format!("bad redirect target: {e}")))?;
        }

        Err(CheckError::InvalidUrl(format!(
            "short link exceeded {MAX_REDIRECT_HOPS} redirects: {url}"
        )))
    }
}

pub struct UrlNormalizer {
    resolver: Arc<dyn RedirectResolver>,
}

impl UrlNormalizer {
    pub fn new(resolver: Arc<dyn RedirectResolver>) -> Self {
        Self { resolver }
    }

    /// Canonicalize a raw video URL into a stable identity: strip query
    /// decoration, resolve short links, extract the video id.
    pub async fn normalize(&self, raw_url: &str) -> Result<VideoIdentity, CheckError> {
        let url = Url::parse(raw_url.trim())
            .map_err(|e| CheckError::InvalidUrl(format!("{raw_url}: {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CheckError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .ok_or_else(|| CheckError::InvalidUrl(format!("no host in {raw_url}")))?;

        let resolved = if SHORT_LINK_HOSTS.contains(&host) {
            self.resolver.resolve(&url).await?
        } else if VIDEO_HOSTS.contains(&host) {
            url
        } else {
            return Err(CheckError::InvalidUrl(format!(
                "not a recognized video host: {host}"
            )));
        };

        canonicalize(&resolved).ok_or_else(|| {
            CheckError::InvalidUrl(format!("no video id in resolved URL: {resolved}"))
        })
    }
}

/// Pure canonicalization of a resolved full-form URL. Query-string noise is
/// discarded; equivalent URLs map to the same identity.
fn canonicalize(url: &Url) -> Option<VideoIdentity> {
    let host = url.host_str()?;
    if !VIDEO_HOSTS.contains(&host) {
        return None;
    }
    let caps = VIDEO_PATH_RE.captures(url.path())?;
    let handle = caps.get(1)?.as_str();
    let video_id = caps.get(2)?.as_str();
    Some(VideoIdentity {
        canonical_url: format!("https://www.tiktok.com/{handle}/video/{video_id}"),
        video_id: video_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticResolver(Url);

    #[async_trait]
    impl RedirectResolver for StaticResolver {
        async fn resolve(&self, _url: &Url) -> Result<Url, CheckError> {
            Ok(self.0.clone())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl RedirectResolver for FailingResolver {
        async fn resolve(&self, url: &Url) -> Result<Url, CheckError> {
            Err(CheckError::InvalidUrl(format!(
                "short link exceeded {MAX_REDIRECT_HOPS} redirects: {url}"
            )))
        }
    }

    fn normalizer_resolving_to(target: &str) -> UrlNormalizer {
        UrlNormalizer::new(Arc::new(StaticResolver(Url::parse(target).unwrap())))
    }

    #[tokio::test]
    async fn tracking_params_do_not_change_identity() {
        let n = normalizer_resolving_to("https://www.tiktok.com/@alice/video/555");
        let plain = n
            .normalize("https://www.tiktok.com/@alice/video/555")
            .await
            .unwrap();
        let noisy = n
            .normalize("https://www.tiktok.com/@alice/video/555?lang=en&utm_source=share&is_copy_url=1")
            .await
            .unwrap();
        assert_eq!(plain, noisy);
        assert_eq!(plain.video_id, "555");
        assert_eq!(plain.canonical_url, "https://www.tiktok.com/@alice/video/555");
    }

    #[tokio::test]
    async fn short_link_resolves_to_same_identity_as_full_url() {
        let n = normalizer_resolving_to("https://www.tiktok.com/@alice/video/555?lang=en");
        let from_short = n.normalize("https://vm.tiktok.com/ZMxyz/").await.unwrap();
        let from_full = n
            .normalize("https://www.tiktok.com/@alice/video/555")
            .await
            .unwrap();
        assert_eq!(from_short, from_full);
    }

    #[tokio::test]
    async fn mobile_host_canonicalizes_to_www() {
        let n = normalizer_resolving_to("https://www.tiktok.com/@x/video/1");
        let identity = n
            .normalize("https://m.tiktok.com/@alice/video/555")
            .await
            .unwrap();
        assert_eq!(identity.canonical_url, "https://www.tiktok.com/@alice/video/555");
    }

    #[tokio::test]
    async fn non_video_hosts_are_rejected() {
        let n = normalizer_resolving_to("https://www.tiktok.com/@x/video/1");
        let err = n.normalize("https://www.youtube.com/watch?v=abc").await;
        assert!(matches!(err, Err(CheckError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn non_http_schemes_are_rejected() {
        let n = normalizer_resolving_to("https://www.tiktok.com/@x/video/1");
        let err = n.normalize("ftp://www.tiktok.com/@alice/video/555").await;
        assert!(matches!(err, Err(CheckError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn path_without_video_id_is_rejected() {
        let n = normalizer_resolving_to("https://www.tiktok.com/@x/video/1");
        let err = n.normalize("https://www.tiktok.com/@alice").await;
        assert!(matches!(err, Err(CheckError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn redirect_loop_surfaces_as_invalid_url() {
        let n = UrlNormalizer::new(Arc::new(FailingResolver));
        let err = n.normalize("https://vm.tiktok.com/ZMxyz/").await;
        assert!(matches!(err, Err(CheckError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn short_link_resolving_outside_video_hosts_is_rejected() {
        let n = normalizer_resolving_to("https://www.example.com/gone");
        let err = n.normalize("https://vt.tiktok.com/ZMxyz/").await;
        assert!(matches!(err, Err(CheckError::InvalidUrl(_))));
    }
}
