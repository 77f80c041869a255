use serde::{Deserialize, Serialize};

/// Video metadata as returned by the Supadata unified `/metadata` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Direct audio reference, when the platform exposes one. Useful as a
    /// fallback when no transcript exists.
    pub audio_url: Option<String>,
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub shares: Option<u64>,
    pub comments: Option<u64>,
}

/// Plain-text transcript as returned by the `/transcript` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
}

// --- Wire formats ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetadataResponse {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorData>,
    #[serde(default)]
    pub stats: Option<StatsData>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthorData {
    pub username: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct StatsData {
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub shares: Option<u64>,
    pub comments: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptResponse {
    pub content: Option<String>,
    pub lang: Option<String>,
}

impl From<MetadataResponse> for VideoMetadata {
    fn from(raw: MetadataResponse) -> Self {
        let author = raw
            .author
            .and_then(|a| a.username.or(a.display_name));
        let stats = raw.stats.unwrap_or_default();
        VideoMetadata {
            title: raw.title,
            description: raw.description,
            author,
            audio_url: raw.audio_url,
            likes: stats.likes,
            views: stats.views,
            shares: stats.shares,
            comments: stats.comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_response_prefers_username_over_display_name() {
        let json = r#"{
            "title": "Test Video",
            "description": "desc",
            "author": {"username": "alice", "displayName": "Alice A."},
            "stats": {"likes": 10, "views": 200, "shares": 3, "comments": 5}
        }"#;
        let raw: MetadataResponse = serde_json::from_str(json).unwrap();
        let meta = VideoMetadata::from(raw);
        assert_eq!(meta.author.as_deref(), Some("alice"));
        assert_eq!(meta.views, Some(200));
        assert_eq!(meta.audio_url, None);
    }

    #[test]
    fn metadata_response_tolerates_missing_sections() {
        let raw: MetadataResponse = serde_json::from_str(r#"{"title": "t"}"#).unwrap();
        let meta = VideoMetadata::from(raw);
        assert_eq!(meta.title.as_deref(), Some("t"));
        assert_eq!(meta.author, None);
        assert_eq!(meta.likes, None);
    }

    #[test]
    fn transcript_response_parses_content_and_lang() {
        let raw: TranscriptResponse =
            serde_json::from_str(r#"{"content": "hello world", "lang": "en"}"#).unwrap();
        assert_eq!(raw.content.as_deref(), Some("hello world"));
        assert_eq!(raw.lang.as_deref(), Some("en"));
    }
}
