use serde::{Deserialize, Serialize};

/// Canonical identity of one video, independent of URL decoration.
/// Produced by the normalizer; the video id is the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoIdentity {
    pub canonical_url: String,
    pub video_id: String,
}

impl VideoIdentity {
    pub fn cache_key(&self) -> &str {
        &self.video_id
    }
}

/// Merged metadata + transcript record. Built once by the fetch orchestrator,
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVideoRecord {
    pub url: String,
    pub video_id: String,

    // Metadata
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Audio reference surfaced as a fallback when no transcript exists.
    pub audio_url: Option<String>,

    // Engagement
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub shares: Option<u64>,
    pub comments: Option<u64>,

    // Transcript
    pub transcript: Option<String>,
    pub transcript_language: Option<String>,
    #[serde(default)]
    pub has_transcript: bool,
}

/// Tri-state factuality verdict. Never a plain boolean: "we could not verify"
/// is a distinct outcome from "false".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    True,
    False,
    Unknown,
}

/// A supporting reference. `url` may be a search-results URL when the model
/// gave no direct citation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub publisher: String,
    pub url: String,
}

/// One extracted assertion with its verdict and supporting sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    pub verdict: Verdict,
    pub justification: String,
    /// Weight in [0,1]: how central this claim is to the video's message.
    pub importance: f64,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredibilityLevel {
    High,
    Medium,
    Low,
    Unknown,
}

/// Bucket boundaries for deriving the categorical level from the score.
/// A tunable, not a hardcoded law.
#[derive(Debug, Clone, Copy)]
pub struct CredibilityThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for CredibilityThresholds {
    fn default() -> Self {
        Self {
            high: 0.8,
            medium: 0.5,
        }
    }
}

impl CredibilityLevel {
    /// Pure function of the score. The model's own self-reported bucket is
    /// never trusted.
    pub fn from_score(score: f64, thresholds: CredibilityThresholds) -> Self {
        if score >= thresholds.high {
            CredibilityLevel::High
        } else if score >= thresholds.medium {
            CredibilityLevel::Medium
        } else {
            CredibilityLevel::Low
        }
    }
}

/// The terminal artifact of one check request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub video_url: String,
    pub credibility_score: f64,
    pub credibility_level: CredibilityLevel,
    pub summary: String,
    pub claims: Vec<Claim>,
    pub has_transcript: bool,
    pub analyzed_text: Option<String>,
    pub processing_time_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credibility_buckets_at_default_thresholds() {
        let t = CredibilityThresholds::default();
        assert_eq!(CredibilityLevel::from_score(1.0, t), CredibilityLevel::High);
        assert_eq!(CredibilityLevel::from_score(0.8, t), CredibilityLevel::High);
        assert_eq!(
            CredibilityLevel::from_score(0.79, t),
            CredibilityLevel::Medium
        );
        assert_eq!(
            CredibilityLevel::from_score(0.5, t),
            CredibilityLevel::Medium
        );
        assert_eq!(CredibilityLevel::from_score(0.49, t), CredibilityLevel::Low);
        assert_eq!(CredibilityLevel::from_score(0.0, t), CredibilityLevel::Low);
    }

    #[test]
    fn credibility_buckets_follow_custom_thresholds() {
        let t = CredibilityThresholds {
            high: 0.9,
            medium: 0.3,
        };
        assert_eq!(
            CredibilityLevel::from_score(0.85, t),
            CredibilityLevel::Medium
        );
        assert_eq!(
            CredibilityLevel::from_score(0.2, t),
            CredibilityLevel::Low
        );
    }

    #[test]
    fn verdict_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Verdict::True).unwrap(), "\"true\"");
        assert_eq!(
            serde_json::to_string(&Verdict::Unknown).unwrap(),
            "\"unknown\""
        );
        let v: Verdict = serde_json::from_str("\"false\"").unwrap();
        assert_eq!(v, Verdict::False);
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = RawVideoRecord {
            url: "https://www.tiktok.com/@alice/video/555".to_string(),
            video_id: "555".to_string(),
            title: Some("caption".to_string()),
            description: None,
            author: Some("alice".to_string()),
            audio_url: None,
            likes: Some(10),
            views: Some(1000),
            shares: None,
            comments: None,
            transcript: Some("hello".to_string()),
            transcript_language: Some("en".to_string()),
            has_transcript: true,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: RawVideoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.video_id, "555");
        assert!(back.has_transcript);
    }
}
