//! Tubescribe - extract clean, paragraph-formatted transcripts from YouTube videos
//!
//! This library resolves the many shapes of YouTube URLs into a canonical video id,
//! picks the best caption track the platform offers (manual English, then generated
//! English, then anything), and reflows the cue stream into readable prose. The same
//! pipeline backs the `tubescribe` CLI and its HTTP service.

pub mod batch;
pub mod cli;
pub mod config;
pub mod metadata;
pub mod output;
pub mod resolver;
pub mod server;
pub mod transcribe;
pub mod transcript;
pub mod utils;

pub use cli::{Cli, Commands, LogFormat, OutputFormat};
pub use config::Config;
pub use resolver::{resolve, VideoId};
pub use transcribe::{TranscriptionPipeline, TranscriptionResult};
pub use transcript::{
    select_transcript, FetchError, FormattedTranscript, SelectedTranscript, TranscriptCandidate,
    TranscriptCue, TranscriptLister,
};

/// Result type used by the glue layers (config, CLI, output)
pub type Result<T> = anyhow::Result<T>;

/// Error types produced by the transcript pipeline
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidUrl(String),

    #[error("No transcript available for video {0}")]
    NoTranscriptAvailable(String),

    #[error("Failed to fetch transcript for video {video_id}: {source}")]
    FetchFailed {
        video_id: String,
        #[source]
        source: FetchError,
    },
}

impl TranscriptorError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptorError::InvalidUrl(_) => "invalid_url",
            TranscriptorError::NoTranscriptAvailable(_) => "no_transcript_available",
            TranscriptorError::FetchFailed { .. } => "fetch_failed",
        }
    }

    /// Whether retrying the same request later could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranscriptorError::FetchFailed { .. })
    }

    /// Short guidance shown to end users alongside the error
    pub fn hint(&self) -> &'static str {
        match self {
            TranscriptorError::InvalidUrl(_) => "check the URL or video ID and try again",
            TranscriptorError::NoTranscriptAvailable(_) => "this video has no captions",
            TranscriptorError::FetchFailed { .. } => "YouTube could not be reached, try again later",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_stay_distinct() {
        let invalid = TranscriptorError::InvalidUrl("nope".to_string());
        let missing = TranscriptorError::NoTranscriptAvailable("dQw4w9WgXcQ".to_string());
        let failed = TranscriptorError::FetchFailed {
            video_id: "dQw4w9WgXcQ".to_string(),
            source: FetchError::RateLimited,
        };

        assert_eq!(invalid.kind(), "invalid_url");
        assert_eq!(missing.kind(), "no_transcript_available");
        assert_eq!(failed.kind(), "fetch_failed");

        assert!(!invalid.is_retryable());
        assert!(!missing.is_retryable());
        assert!(failed.is_retryable());
    }

    #[test]
    fn test_invalid_url_keeps_raw_input() {
        let err = TranscriptorError::InvalidUrl("https://example.com/".to_string());
        assert!(err.to_string().contains("https://example.com/"));
    }

    #[test]
    fn test_fetch_failed_exposes_source() {
        use std::error::Error;

        let err = TranscriptorError::FetchFailed {
            video_id: "dQw4w9WgXcQ".to_string(),
            source: FetchError::VideoUnavailable,
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("dQw4w9WgXcQ"));
    }
}
