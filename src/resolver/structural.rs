//! Structural stage of URL resolution.
//!
//! Slower than the regex table but correct for parameter reordering and
//! percent-encoded components.

use url::Url;

use super::UrlShape;

/// Parse the input as a URL and pull the candidate id out of the matching component
///
/// The returned candidate is decoded but not validated. A decoded candidate
/// is cut at the first URL delimiter, so `v=<id>%26t%3D10` still yields the id.
pub fn parse_structurally(input: &str) -> Option<(UrlShape, String)> {
    let url = parse_lenient(input)?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let raw_host = url.host_str()?.to_ascii_lowercase();
    let host = raw_host
        .strip_prefix("www.")
        .or_else(|| raw_host.strip_prefix("m."))
        .unwrap_or(raw_host.as_str());

    let mut segments = url.path_segments()?.filter(|segment| !segment.is_empty());

    let candidate = match host {
        "youtu.be" => segments.next().and_then(decode).map(|id| (UrlShape::Short, id)),
        "youtube.com" => {
            let first = segments.next()?.to_ascii_lowercase();
            match first.as_str() {
                "watch" => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| (UrlShape::Watch, value.into_owned())),
                "shorts" => segments.next().and_then(decode).map(|id| (UrlShape::Shorts, id)),
                "live" => segments.next().and_then(decode).map(|id| (UrlShape::Live, id)),
                "embed" => segments.next().and_then(decode).map(|id| (UrlShape::Embed, id)),
                _ => None,
            }
        }
        _ => None,
    };

    candidate.map(|(shape, id)| (shape, cut_at_delimiter(id)))
}

fn cut_at_delimiter(mut candidate: String) -> String {
    if let Some(end) = candidate.find(|c: char| matches!(c, '&' | '?' | '#' | '/')) {
        candidate.truncate(end);
    }
    candidate
}

/// Parse with an implied `https://` when the input carries no scheme
fn parse_lenient(input: &str) -> Option<Url> {
    if input.is_empty() {
        return None;
    }

    if input.contains("://") {
        Url::parse(input).ok()
    } else {
        Url::parse(&format!("https://{}", input)).ok()
    }
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_query_in_any_position() {
        assert_eq!(
            parse_structurally("https://www.youtube.com/watch?t=1&v=dQw4w9WgXcQ"),
            Some((UrlShape::Watch, "dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_missing_scheme_is_assumed_https() {
        assert_eq!(
            parse_structurally("youtu.be/dQw4w9WgXcQ"),
            Some((UrlShape::Short, "dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_path_segments_are_percent_decoded() {
        assert_eq!(
            parse_structurally("https://m.youtube.com/embed/dQw4w9WgXc%51"),
            Some((UrlShape::Embed, "dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_encoded_delimiter_after_id_is_cut() {
        assert_eq!(
            parse_structurally("https://www.youtube.com/watch?v=dQw4w9WgXcQ%26t%3D10"),
            Some((UrlShape::Watch, "dQw4w9WgXcQ".to_string()))
        );
        assert_eq!(
            parse_structurally("https://youtu.be/dQw4w9WgXcQ%3Fsi%3Dabc"),
            Some((UrlShape::Short, "dQw4w9WgXcQ".to_string()))
        );
        assert_eq!(
            parse_structurally("https://www.youtube.com/watch?v=dQw4w9WgXcQ/"),
            Some((UrlShape::Watch, "dQw4w9WgXcQ".to_string()))
        );
    }

    #[test]
    fn test_candidate_is_returned_unvalidated() {
        assert_eq!(
            parse_structurally("https://youtube.com/shorts/too-long-to-be-an-id"),
            Some((UrlShape::Shorts, "too-long-to-be-an-id".to_string()))
        );
    }

    #[test]
    fn test_unrecognized_inputs() {
        assert_eq!(parse_structurally("not a url"), None);
        assert_eq!(parse_structurally("https://example.com/"), None);
        assert_eq!(parse_structurally("https://www.youtube.com/watch"), None);
        assert_eq!(parse_structurally("https://www.youtube.com/playlist?list=PL1"), None);
        assert_eq!(parse_structurally("ftp://youtube.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(parse_structurally(""), None);
    }
}
