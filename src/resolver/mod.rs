//! Identifier resolution: any accepted URL shape or bare id to a [`VideoId`].

use serde::Serialize;
use std::fmt;

pub mod patterns;
pub mod structural;

use crate::TranscriptorError;

/// Canonical 11-character YouTube video identifier
///
/// Only validated strings become a `VideoId`, so anything holding one can skip
/// re-checking the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Number of characters in every video id
    pub const LEN: usize = 11;

    /// Validate a candidate string and wrap it
    pub fn parse(candidate: &str) -> Option<Self> {
        is_valid_video_id(candidate).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Standard watch URL for this video
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// URL shapes the resolver understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlShape {
    /// `youtube.com/watch?v=<id>`
    Watch,
    /// `youtu.be/<id>`
    Short,
    /// `youtube.com/shorts/<id>`
    Shorts,
    /// `youtube.com/live/<id>`
    Live,
    /// `youtube.com/embed/<id>`
    Embed,
}

impl fmt::Display for UrlShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlShape::Watch => write!(f, "watch"),
            UrlShape::Short => write!(f, "short-link"),
            UrlShape::Shorts => write!(f, "shorts"),
            UrlShape::Live => write!(f, "live"),
            UrlShape::Embed => write!(f, "embed"),
        }
    }
}

/// True for exactly 11 characters drawn from `[A-Za-z0-9_-]`
pub fn is_valid_video_id(candidate: &str) -> bool {
    candidate.len() == VideoId::LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Resolve a URL or bare id into a canonical `VideoId`
///
/// Tries, in order: the bare-id shape, the regex pattern table, then structural
/// URL parsing. The candidate from whichever stage matched is validated before it
/// is returned. Every failure is `InvalidUrl` carrying the untouched input.
pub fn resolve(raw: &str) -> Result<VideoId, TranscriptorError> {
    let input = raw.trim();

    if let Some(id) = VideoId::parse(input) {
        return Ok(id);
    }

    let candidate = patterns::match_patterns(input)
        .map(|(shape, id)| (shape, id.to_string()))
        .or_else(|| structural::parse_structurally(input));

    match candidate {
        Some((shape, id)) => match VideoId::parse(&id) {
            Some(id) => {
                tracing::debug!("Resolved {} URL to video id {}", shape, id);
                Ok(id)
            }
            None => {
                tracing::debug!("Rejected {} URL candidate {:?}", shape, id);
                Err(TranscriptorError::InvalidUrl(raw.to_string()))
            }
        },
        None => Err(TranscriptorError::InvalidUrl(raw.to_string())),
    }
}
