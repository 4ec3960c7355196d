//! Transcript track selection.
//!
//! A [`TranscriptLister`] offers the tracks of a video; the best one is picked
//! by a fixed tier table and its cues are reflowed into prose.

use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;

pub mod reflow;
pub mod youtube;

pub use reflow::ReflowOptions;

use crate::resolver::VideoId;
use crate::TranscriptorError;

/// Opaque reference the lister uses to fetch a track's cues
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackHandle(String);

impl TrackHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One transcript track offered for a video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptCandidate {
    /// Language code as reported upstream ("en", "en-GB", "es", ...)
    pub language_code: String,

    /// Human-readable language name
    pub language: String,

    /// Auto-generated (ASR) rather than authored captions
    pub is_generated: bool,

    #[serde(skip)]
    pub handle: TrackHandle,
}

impl TranscriptCandidate {
    pub fn new(
        language_code: impl Into<String>,
        language: impl Into<String>,
        is_generated: bool,
        handle: TrackHandle,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            language: language.into(),
            is_generated,
            handle,
        }
    }

    /// "en" or any regional English variant ("en-US", "en-GB", ...)
    pub fn is_english(&self) -> bool {
        let code = self.language_code.to_ascii_lowercase();
        code == "en" || code.starts_with("en-")
    }
}

/// A timed caption fragment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptCue {
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptCue {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Cleaned prose transcript: paragraphs separated by a blank line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormattedTranscript(String);

impl FormattedTranscript {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.0.split("\n\n").filter(|p| !p.is_empty())
    }
}

impl fmt::Display for FormattedTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FormattedTranscript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// The chosen track and its reflowed text
#[derive(Debug, Clone)]
pub struct SelectedTranscript {
    pub candidate: TranscriptCandidate,
    pub text: FormattedTranscript,
}

/// Failures talking to the upstream transcript service
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("YouTube responded with HTTP {0}")]
    HttpStatus(u16),

    #[error("YouTube is rate limiting requests from this IP")]
    RateLimited,

    #[error("video is unavailable")]
    VideoUnavailable,

    #[error("video requires sign-in (age restriction or bot check)")]
    LoginRequired,

    #[error("video is not playable: {0}")]
    Unplayable(String),

    #[error("unexpected YouTube response: {0}")]
    Unparsable(String),

    #[error("caption track is no longer available")]
    TrackUnavailable,
}

/// Upstream capability that lists a video's tracks and fetches their cues
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptLister: Send + Sync {
    /// All tracks offered for the video, in upstream order
    ///
    /// A video without captions lists as empty rather than failing.
    async fn list_candidates(&self, id: &VideoId) -> Result<Vec<TranscriptCandidate>, FetchError>;

    /// Ordered cues of one track
    async fn fetch_cues(&self, candidate: &TranscriptCandidate) -> Result<Vec<TranscriptCue>, FetchError>;
}

struct SelectionTier {
    name: &'static str,
    accepts: fn(&TranscriptCandidate) -> bool,
}

fn is_manual_english(candidate: &TranscriptCandidate) -> bool {
    candidate.is_english() && !candidate.is_generated
}

fn is_generated_english(candidate: &TranscriptCandidate) -> bool {
    candidate.is_english() && candidate.is_generated
}

fn is_any(_: &TranscriptCandidate) -> bool {
    true
}

const SELECTION_TIERS: [SelectionTier; 3] = [
    SelectionTier {
        name: "manual English",
        accepts: is_manual_english,
    },
    SelectionTier {
        name: "generated English",
        accepts: is_generated_english,
    },
    SelectionTier {
        name: "first available",
        accepts: is_any,
    },
];

/// Pick the best track; returns the name of the tier that matched
pub fn choose_candidate(
    candidates: &[TranscriptCandidate],
) -> Option<(&'static str, &TranscriptCandidate)> {
    SELECTION_TIERS.iter().find_map(|tier| {
        candidates
            .iter()
            .find(|candidate| (tier.accepts)(candidate))
            .map(|candidate| (tier.name, candidate))
    })
}

/// List a video's tracks, choose one, fetch its cues and reflow them
pub async fn select_transcript(
    id: &VideoId,
    lister: &dyn TranscriptLister,
    options: &ReflowOptions,
) -> Result<SelectedTranscript, TranscriptorError> {
    let fetch_failed = |source| TranscriptorError::FetchFailed {
        video_id: id.to_string(),
        source,
    };

    let candidates = lister.list_candidates(id).await.map_err(fetch_failed)?;
    tracing::debug!("{} transcript track(s) listed for {}", candidates.len(), id);

    let (tier, candidate) = choose_candidate(&candidates)
        .ok_or_else(|| TranscriptorError::NoTranscriptAvailable(id.to_string()))?;

    tracing::info!(
        "Using {} transcript for {} ({}, {})",
        tier,
        id,
        candidate.language_code,
        if candidate.is_generated { "generated" } else { "manual" }
    );

    let cues = lister.fetch_cues(candidate).await.map_err(fetch_failed)?;
    let text = reflow::reflow(&cues, options);

    if text.is_empty() {
        return Err(TranscriptorError::NoTranscriptAvailable(id.to_string()));
    }

    Ok(SelectedTranscript {
        candidate: candidate.clone(),
        text,
    })
}
