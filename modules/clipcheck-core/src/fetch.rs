use async_trait::async_trait;

use clipcheck_common::{CheckError, RawVideoRecord, VideoIdentity};
use supadata_client::{SupadataClient, SupadataError, Transcript, VideoMetadata};

/// Fetch seam: metadata and transcript are independent operations so the
/// orchestrator can fan them out and tests can fake either side.
#[async_trait]
pub trait VideoFetcher: Send + Sync {
    async fn metadata(&self, url: &str) -> supadata_client::Result<VideoMetadata>;
    async fn transcript(&self, url: &str) -> supadata_client::Result<Transcript>;
}

#[async_trait]
impl VideoFetcher for SupadataClient {
    async fn metadata(&self, url: &str) -> supadata_client::Result<VideoMetadata> {
        self.fetch_metadata(url).await
    }

    async fn transcript(&self, url: &str) -> supadata_client::Result<Transcript> {
        self.fetch_transcript(url).await
    }
}

pub(crate) fn map_fetch_error(err: SupadataError) -> CheckError {
    match err {
        SupadataError::Auth => CheckError::Auth(err.to_string()),
        SupadataError::CreditsExhausted => CheckError::CreditsExhausted(err.to_string()),
        SupadataError::RateLimited(msg) => CheckError::RateLimited(msg),
        SupadataError::NotFound(msg) => CheckError::NotFound(msg),
        SupadataError::Network(msg) | SupadataError::Parse(msg) => CheckError::Upstream(msg),
        SupadataError::Api { status, message } => {
            CheckError::Upstream(format!("status {status}: {message}"))
        }
    }
}

/// Fetch metadata and transcript concurrently and merge them into one record.
///
/// Metadata failure is fatal. A missing transcript (`NotFound`) is expected —
/// plenty of videos have no captions — and yields `has_transcript = false`
/// with whatever fallback the metadata provided (e.g. an audio reference).
/// Any other transcript failure is fatal.
pub async fn fetch_video(
    fetcher: &dyn VideoFetcher,
    identity: &VideoIdentity,
) -> Result<RawVideoRecord, CheckError> {
    let url = identity.canonical_url.as_str();

    let (metadata, transcript) = tokio::join!(fetcher.metadata(url), fetcher.transcript(url));

    let metadata = metadata.map_err(map_fetch_error)?;
    let transcript = match transcript {
        Ok(t) => Some(t),
        Err(SupadataError::NotFound(_)) => {
            tracing::info!(url, "No transcript available");
            None
        }
        Err(e) => return Err(map_fetch_error(e)),
    };

    let has_transcript = transcript.is_some();
    Ok(RawVideoRecord {
        url: identity.canonical_url.clone(),
        video_id: identity.video_id.clone(),
        title: metadata.title,
        description: metadata.description,
        author: metadata.author,
        audio_url: metadata.audio_url,
        likes: metadata.likes,
        views: metadata.views,
        shares: metadata.shares,
        comments: metadata.comments,
        transcript: transcript.as_ref().map(|t| t.text.clone()),
        transcript_language: transcript.and_then(|t| t.language),
        has_transcript,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeFetcher {
        metadata: fn() -> supadata_client::Result<VideoMetadata>,
        transcript: fn() -> supadata_client::Result<Transcript>,
    }

    #[async_trait]
    impl VideoFetcher for FakeFetcher {
        async fn metadata(&self, _url: &str) -> supadata_client::Result<VideoMetadata> {
            (self.metadata)()
        }

        async fn transcript(&self, _url: &str) -> supadata_client::Result<Transcript> {
            (self.transcript)()
        }
    }

    fn identity() -> VideoIdentity {
        VideoIdentity {
            canonical_url: "https://www.tiktok.com/@alice/video/555".to_string(),
            video_id: "555".to_string(),
        }
    }

    fn sample_metadata() -> supadata_client::Result<VideoMetadata> {
        Ok(VideoMetadata {
            title: Some("caption".to_string()),
            author: Some("alice".to_string()),
            audio_url: Some("https://cdn.example.com/audio.mp3".to_string()),
            views: Some(1000),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn merges_metadata_and_transcript() {
        let fetcher = FakeFetcher {
            metadata: sample_metadata,
            transcript: || {
                Ok(Transcript {
                    text: "hello world".to_string(),
                    language: Some("en".to_string()),
                })
            },
        };

        let record = fetch_video(&fetcher, &identity()).await.unwrap();
        assert!(record.has_transcript);
        assert_eq!(record.transcript.as_deref(), Some("hello world"));
        assert_eq!(record.transcript_language.as_deref(), Some("en"));
        assert_eq!(record.author.as_deref(), Some("alice"));
        assert_eq!(record.video_id, "555");
    }

    #[tokio::test]
    async fn missing_transcript_is_not_fatal() {
        let fetcher = FakeFetcher {
            metadata: sample_metadata,
            transcript: || Err(SupadataError::NotFound("no captions".to_string())),
        };

        let record = fetch_video(&fetcher, &identity()).await.unwrap();
        assert!(!record.has_transcript);
        assert_eq!(record.transcript, None);
        assert_eq!(record.transcript_language, None);
        // Fallback data from metadata still surfaces.
        assert_eq!(
            record.audio_url.as_deref(),
            Some("https://cdn.example.com/audio.mp3")
        );
    }

    #[tokio::test]
    async fn metadata_failure_is_fatal() {
        let fetcher = FakeFetcher {
            metadata: || Err(SupadataError::Auth),
            transcript: || {
                Ok(Transcript {
                    text: "hello".to_string(),
                    language: None,
                })
            },
        };

        let err = fetch_video(&fetcher, &identity()).await;
        assert!(matches!(err, Err(CheckError::Auth(_))));
    }

    #[tokio::test]
    async fn non_notfound_transcript_failure_is_fatal() {
        let fetcher = FakeFetcher {
            metadata: sample_metadata,
            transcript: || Err(SupadataError::CreditsExhausted),
        };

        let err = fetch_video(&fetcher, &identity()).await;
        assert!(matches!(err, Err(CheckError::CreditsExhausted(_))));
    }

    #[test]
    fn fetch_error_mapping_preserves_kinds() {
        assert!(matches!(
            map_fetch_error(SupadataError::RateLimited("429".into())),
            CheckError::RateLimited(_)
        ));
        assert!(matches!(
            map_fetch_error(SupadataError::Api {
                status: 500,
                message: "boom".into()
            }),
            CheckError::Upstream(_)
        ));
    }
}
