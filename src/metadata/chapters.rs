//! Chapter extraction from yt-dlp info JSON and from free-form descriptions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::Chapter;
use crate::utils::{format_timestamp, parse_timestamp};

// "0:00 Intro", "1:05 - Topic", "(01:02:03) – Outro", "12:30 | Q&A"
static DESCRIPTION_CHAPTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\(?(\d{1,2}:\d{2}(?::\d{2})?)\)?\s*(?:[-–—:|]\s*)?([^\s\-–—:|].*?)\s*$")
        .expect("chapter pattern must compile")
});

/// Parse the `chapters` array of a yt-dlp info JSON document
pub fn parse_chapters(info: &Value) -> Vec<Chapter> {
    let Some(entries) = info.get("chapters").and_then(Value::as_array) else {
        return Vec::new();
    };

    let chapters = entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let start_time = entry.get("start_time").and_then(Value::as_f64)?.max(0.0) as u64;
            let end_time = entry
                .get("end_time")
                .and_then(Value::as_f64)
                .map(|t| t.max(0.0) as u64);
            let title = entry
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Chapter {}", i + 1));

            Some(Chapter {
                title,
                start_time,
                end_time,
                timestamp: format_timestamp(start_time),
            })
        })
        .collect();

    backfill_end_times(chapters)
}

/// Parse chapter lines out of a video description
///
/// The timestamp is kept as written.
pub fn parse_chapters_from_description(description: &str) -> Vec<Chapter> {
    let chapters = DESCRIPTION_CHAPTER_REGEX
        .captures_iter(description)
        .filter_map(|caps| {
            let timestamp = caps.get(1)?.as_str();
            let start_time = parse_timestamp(timestamp)?;
            let title = caps
                .get(2)?
                .as_str()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");

            if title.is_empty() {
                return None;
            }

            Some(Chapter {
                title,
                start_time,
                end_time: None,
                timestamp: timestamp.to_string(),
            })
        })
        .collect();

    backfill_end_times(chapters)
}

/// A chapter without an end runs until the next one starts
fn backfill_end_times(mut chapters: Vec<Chapter>) -> Vec<Chapter> {
    for i in 1..chapters.len() {
        let next_start = chapters[i].start_time;
        let previous = &mut chapters[i - 1];
        if previous.end_time.is_none() {
            previous.end_time = Some(next_start);
        }
    }

    chapters
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_chapters_basic() {
        let info = json!({
            "chapters": [
                {"start_time": 0.0, "end_time": 60.0, "title": "Intro"},
                {"start_time": 60.0, "end_time": 180.0, "title": "Main Part"},
                {"start_time": 3725.0, "end_time": 3800.0, "title": "Outro"}
            ]
        });

        let chapters = parse_chapters(&info);
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0].title, "Intro");
        assert_eq!(chapters[0].end_time, Some(60));
        assert_eq!(chapters[1].timestamp, "01:00");
        assert_eq!(chapters[2].timestamp, "01:02:05");
    }

    #[test]
    fn test_parse_chapters_backfills_and_names() {
        let info = json!({
            "chapters": [
                {"start_time": 0.0},
                {"start_time": 90.5, "title": "Second"},
                {"title": "No start"}
            ]
        });

        let chapters = parse_chapters(&info);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Chapter 1");
        assert_eq!(chapters[0].end_time, Some(90));
        assert_eq!(chapters[1].end_time, None);
    }

    #[test]
    fn test_parse_chapters_missing_array() {
        assert!(parse_chapters(&json!({"title": "x"})).is_empty());
        assert!(parse_chapters(&json!({"chapters": null})).is_empty());
    }

    #[test]
    fn test_description_chapters() {
        let description = "Thanks for watching!\n\
                           0:00 Intro\n\
                           1:05 - Getting   started\n\
                           (12:30) | Q&A\n\
                           01:02:03 – Outro\n\
                           Follow me at example.com";

        let chapters = parse_chapters_from_description(description);
        let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Getting started", "Q&A", "Outro"]);

        assert_eq!(chapters[0].start_time, 0);
        assert_eq!(chapters[0].end_time, Some(65));
        assert_eq!(chapters[1].timestamp, "1:05");
        assert_eq!(chapters[2].start_time, 750);
        assert_eq!(chapters[3].start_time, 3723);
        assert_eq!(chapters[3].end_time, None);
    }

    #[test]
    fn test_description_without_chapters() {
        assert!(parse_chapters_from_description("").is_empty());
        assert!(parse_chapters_from_description("Just a description.\nNo timestamps here").is_empty());
        assert!(parse_chapters_from_description("1:00 -  ").is_empty());
    }
}
