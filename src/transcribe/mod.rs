use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::metadata::{MetadataProvider, VideoMetadata, YtDlpMetadata};
use crate::resolver::{self, VideoId};
use crate::transcript::youtube::YoutubeLister;
use crate::transcript::{self, FormattedTranscript, ReflowOptions, TranscriptLister};
use crate::TranscriptorError;

/// Transcript with the track it came from and optional metadata
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptionResult {
    pub video_id: VideoId,

    /// Language code of the chosen track
    pub language_code: String,

    /// Display name of the chosen track's language
    pub language: String,

    /// Whether the chosen track was auto-generated
    pub is_generated: bool,

    /// Paragraph-formatted transcript text
    pub transcript: FormattedTranscript,

    /// Title, uploader, duration and chapters when requested and available
    pub metadata: Option<VideoMetadata>,

    /// Timestamp when the transcript was extracted
    pub extracted_at: DateTime<Utc>,
}

impl TranscriptionResult {
    pub fn title(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.title.as_deref())
    }
}

/// Main transcription pipeline: resolve, select, enrich
pub struct TranscriptionPipeline {
    lister: Arc<dyn TranscriptLister>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    reflow: ReflowOptions,
}

impl TranscriptionPipeline {
    /// Create a pipeline talking to YouTube, with yt-dlp metadata when enabled
    pub fn new(config: &Config) -> Result<Self> {
        let lister = Arc::new(YoutubeLister::new(&config.fetch)?);

        let metadata: Option<Arc<dyn MetadataProvider>> = if config.metadata.enabled {
            Some(Arc::new(YtDlpMetadata::new(config.metadata.yt_dlp_path.clone())))
        } else {
            None
        };

        Ok(Self::with_components(lister, metadata, config.reflow_options()))
    }

    /// Create a pipeline from explicit collaborators
    pub fn with_components(
        lister: Arc<dyn TranscriptLister>,
        metadata: Option<Arc<dyn MetadataProvider>>,
        reflow: ReflowOptions,
    ) -> Self {
        Self {
            lister,
            metadata,
            reflow,
        }
    }

    /// Transcribe one URL or video id
    ///
    /// Metadata failures are logged and leave `metadata` empty; they never
    /// fail the call.
    pub async fn transcribe(
        &self,
        raw: &str,
        include_metadata: bool,
    ) -> std::result::Result<TranscriptionResult, TranscriptorError> {
        let video_id = resolver::resolve(raw)?;
        tracing::info!("Extracting transcript for video {}", video_id);

        let selected =
            transcript::select_transcript(&video_id, self.lister.as_ref(), &self.reflow).await?;

        let metadata = match (&self.metadata, include_metadata) {
            (Some(provider), true) => match provider.fetch(&video_id).await {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    tracing::warn!("Metadata unavailable for {}: {:#}", video_id, e);
                    None
                }
            },
            _ => None,
        };

        tracing::info!(
            "Transcript ready for {} ({} paragraphs)",
            video_id,
            selected.text.paragraphs().count()
        );

        Ok(TranscriptionResult {
            video_id,
            language_code: selected.candidate.language_code,
            language: selected.candidate.language,
            is_generated: selected.candidate.is_generated,
            transcript: selected.text,
            metadata,
            extracted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{
        FetchError, MockTranscriptLister, TrackHandle, TranscriptCandidate, TranscriptCue,
    };
    use async_trait::async_trait;

    struct FixedMetadata(Option<VideoMetadata>);

    #[async_trait]
    impl MetadataProvider for FixedMetadata {
        async fn fetch(&self, _id: &VideoId) -> Result<VideoMetadata> {
            self.0
                .clone()
                .ok_or_else(|| anyhow::anyhow!("yt-dlp failed: network down"))
        }
    }

    fn english_lister() -> MockTranscriptLister {
        let mut lister = MockTranscriptLister::new();
        lister.expect_list_candidates().returning(|_| {
            Ok(vec![TranscriptCandidate::new(
                "en",
                "English",
                true,
                TrackHandle::new("https://example.test/en"),
            )])
        });
        lister
            .expect_fetch_cues()
            .returning(|_| Ok(vec![TranscriptCue::new("hello world", 0.0, 1.0)]));
        lister
    }

    fn titled() -> VideoMetadata {
        VideoMetadata {
            title: Some("Greeting".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_transcribe_with_metadata() {
        let pipeline = TranscriptionPipeline::with_components(
            Arc::new(english_lister()),
            Some(Arc::new(FixedMetadata(Some(titled())))),
            ReflowOptions::default(),
        );

        let result = pipeline
            .transcribe("https://youtu.be/dQw4w9WgXcQ", true)
            .await
            .unwrap();

        assert_eq!(result.video_id.as_str(), "dQw4w9WgXcQ");
        assert_eq!(result.transcript.as_str(), "Hello world.");
        assert_eq!(result.title(), Some("Greeting"));
        assert!(result.is_generated);
    }

    #[tokio::test]
    async fn test_metadata_failure_degrades() {
        let pipeline = TranscriptionPipeline::with_components(
            Arc::new(english_lister()),
            Some(Arc::new(FixedMetadata(None))),
            ReflowOptions::default(),
        );

        let result = pipeline.transcribe("dQw4w9WgXcQ", true).await.unwrap();
        assert!(result.metadata.is_none());
        assert_eq!(result.transcript.as_str(), "Hello world.");
    }

    #[tokio::test]
    async fn test_metadata_skipped_when_not_requested() {
        let pipeline = TranscriptionPipeline::with_components(
            Arc::new(english_lister()),
            Some(Arc::new(FixedMetadata(Some(titled())))),
            ReflowOptions::default(),
        );

        let result = pipeline.transcribe("dQw4w9WgXcQ", false).await.unwrap();
        assert!(result.metadata.is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_lister() {
        let mut lister = MockTranscriptLister::new();
        lister.expect_list_candidates().never();

        let pipeline =
            TranscriptionPipeline::with_components(Arc::new(lister), None, ReflowOptions::default());

        let err = pipeline.transcribe("not a url", true).await.unwrap_err();
        assert!(matches!(err, TranscriptorError::InvalidUrl(ref raw) if raw == "not a url"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_fetch_failed() {
        let mut lister = MockTranscriptLister::new();
        lister
            .expect_list_candidates()
            .returning(|_| Err(FetchError::LoginRequired));

        let pipeline =
            TranscriptionPipeline::with_components(Arc::new(lister), None, ReflowOptions::default());

        let err = pipeline.transcribe("dQw4w9WgXcQ", false).await.unwrap_err();
        assert_eq!(err.kind(), "fetch_failed");
    }

    #[test]
    fn test_result_serializes_transcript_as_string() {
        let result = TranscriptionResult {
            video_id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
            language_code: "en".to_string(),
            language: "English".to_string(),
            is_generated: false,
            transcript: transcript::reflow::reflow_text("hi.", &ReflowOptions::default()),
            metadata: None,
            extracted_at: Utc::now(),
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["video_id"], "dQw4w9WgXcQ");
        assert_eq!(json["transcript"], "Hi.");
        assert!(json["metadata"].is_null());
    }
}
