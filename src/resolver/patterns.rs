//! Regex stage of URL resolution.
//!
//! Fast path for the URL shapes people actually paste. Anything the table does
//! not anticipate (reordered query parameters, percent-encoding) is left to
//! [`super::structural`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::UrlShape;

/// A matcher paired with the capture group that holds the candidate id
pub struct UrlPattern {
    pub shape: UrlShape,
    regex: Regex,
    group: usize,
}

impl UrlPattern {
    fn new(shape: UrlShape, pattern: &str) -> Self {
        Self {
            shape,
            regex: Regex::new(pattern).expect("URL pattern table must compile"),
            group: 1,
        }
    }

    /// Candidate id if this pattern matches at the start of the input
    pub fn extract<'a>(&self, input: &'a str) -> Option<&'a str> {
        self.regex
            .captures(input)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str())
    }
}

// The id must be followed by a delimiter or the end of input so longer runs
// never match as a truncated id.
static URL_PATTERNS: Lazy<Vec<UrlPattern>> = Lazy::new(|| {
    vec![
        UrlPattern::new(
            UrlShape::Watch,
            r"(?i)^(?:https?://)?(?:(?:www|m)\.)?youtube\.com/watch/?\?v=([A-Za-z0-9_-]{11})(?:[&#/?]|$)",
        ),
        UrlPattern::new(
            UrlShape::Short,
            r"(?i)^(?:https?://)?(?:(?:www|m)\.)?youtu\.be/([A-Za-z0-9_-]{11})(?:[/?#&]|$)",
        ),
        UrlPattern::new(
            UrlShape::Shorts,
            r"(?i)^(?:https?://)?(?:(?:www|m)\.)?youtube\.com/shorts/([A-Za-z0-9_-]{11})(?:[/?#&]|$)",
        ),
        UrlPattern::new(
            UrlShape::Live,
            r"(?i)^(?:https?://)?(?:(?:www|m)\.)?youtube\.com/live/([A-Za-z0-9_-]{11})(?:[/?#&]|$)",
        ),
        UrlPattern::new(
            UrlShape::Embed,
            r"(?i)^(?:https?://)?(?:(?:www|m)\.)?youtube\.com/embed/([A-Za-z0-9_-]{11})(?:[/?#&]|$)",
        ),
    ]
});

/// The ordered pattern table
pub fn url_patterns() -> &'static [UrlPattern] {
    &URL_PATTERNS
}

/// Try each pattern in order; the first match wins
pub fn match_patterns(input: &str) -> Option<(UrlShape, &str)> {
    url_patterns()
        .iter()
        .find_map(|pattern| pattern.extract(input).map(|id| (pattern.shape, id)))
}
